use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use rhai::{CallFnOptions, Dynamic, Engine, EvalAltResult, ImmutableString, Position, Scope, AST, FLOAT};

use crate::ecs::{Entity, EntityHandle};
use crate::runtime::SharedState;

const LOG_TARGET: &str = "scene_player::script";
const UPDATE_ENTRY_POINT: &str = "OnUpdate";

type CallResult<T> = Result<T, Box<EvalAltResult>>;

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptLogEntry {
    Print(String),
    Error { entity: String, message: String },
}

#[derive(Clone)]
pub struct ScriptApi {
    state: SharedState,
    logs: Rc<RefCell<Vec<ScriptLogEntry>>>,
}

impl ScriptApi {
    pub fn new(state: SharedState) -> Self {
        Self { state, logs: Rc::new(RefCell::new(Vec::new())) }
    }

    /// Scripts pass handles as integers; `()` and non-integers never resolve.
    fn resolve(&self, handle: &Dynamic) -> Option<EntityHandle> {
        let raw = handle.as_int().ok()?;
        self.state.borrow().world.resolve(raw).ok()
    }

    fn read<R>(&self, handle: &Dynamic, f: impl FnOnce(&Entity) -> R) -> Option<R> {
        let handle = self.resolve(handle)?;
        let state = self.state.borrow();
        state.world.get(handle).ok().map(f)
    }

    fn write(&self, handle: &Dynamic, f: impl FnOnce(&mut Entity)) -> bool {
        let Some(handle) = self.resolve(handle) else {
            return false;
        };
        let mut state = self.state.borrow_mut();
        match state.world.get_mut(handle) {
            Ok(entity) => {
                f(entity);
                true
            }
            Err(_) => false,
        }
    }

    fn get_object_by_name(&self, name: &str) -> Dynamic {
        match self.state.borrow().world.find_first_by_name(name) {
            Some(handle) => Dynamic::from(handle.to_script()),
            None => Dynamic::UNIT,
        }
    }

    fn get_self(&self) -> Dynamic {
        match self.state.borrow().current_self {
            Some(handle) => Dynamic::from(handle.to_script()),
            None => Dynamic::UNIT,
        }
    }

    fn read_vec3(&self, handle: &Dynamic, f: impl FnOnce(&Entity) -> Vec3) -> Dynamic {
        self.read(handle, f).map(vec3_to_script).unwrap_or(Dynamic::UNIT)
    }

    fn is_visible(&self, handle: &Dynamic) -> bool {
        self.read(handle, |entity| entity.visible).unwrap_or(false)
    }

    fn is_key_pressed(&self, name: &str) -> bool {
        self.state.borrow().input.is_script_key_down(name)
    }

    fn delta_time(&self) -> FLOAT {
        self.state.borrow().delta_seconds as FLOAT
    }

    fn distance(&self, a: &Dynamic, b: &Dynamic) -> FLOAT {
        let (Some(a), Some(b)) = (self.resolve(a), self.resolve(b)) else {
            return -1.0;
        };
        self.state.borrow().world.distance(a, b).map(|d| d as FLOAT).unwrap_or(-1.0)
    }

    fn play_animation(&self, handle: &Dynamic, clip: &str) -> bool {
        self.write(handle, |entity| entity.animation.play(clip))
    }

    fn stop_animation(&self, handle: &Dynamic) -> bool {
        self.write(handle, |entity| entity.animation.stop())
    }

    fn print(&self, message: String) {
        log::info!(target: LOG_TARGET, "{message}");
        self.logs.borrow_mut().push(ScriptLogEntry::Print(message));
    }

    fn report_error(&self, entity: &str, message: String) {
        log::error!(target: LOG_TARGET, "Script error in {entity}: {message}");
        self.logs.borrow_mut().push(ScriptLogEntry::Error { entity: entity.to_string(), message });
    }
}

fn vec3_to_script(v: Vec3) -> Dynamic {
    Dynamic::from_array(vec![
        Dynamic::from(v.x as FLOAT),
        Dynamic::from(v.y as FLOAT),
        Dynamic::from(v.z as FLOAT),
    ])
}

fn number(value: &Dynamic) -> CallResult<f32> {
    if let Ok(float) = value.as_float() {
        return Ok(float as f32);
    }
    if let Ok(int) = value.as_int() {
        return Ok(int as f32);
    }
    Err(Box::new(EvalAltResult::ErrorMismatchDataType(
        "number".to_string(),
        value.type_name().to_string(),
        Position::NONE,
    )))
}

fn vec3_args(x: &Dynamic, y: &Dynamic, z: &Dynamic) -> CallResult<Vec3> {
    Ok(Vec3::new(number(x)?, number(y)?, number(z)?))
}

fn register_vec3_setter(engine: &mut Engine, api: &ScriptApi, name: &str, apply: fn(&mut Entity, Vec3)) {
    let api = api.clone();
    engine.register_fn(name, move |handle: Dynamic, x: Dynamic, y: Dynamic, z: Dynamic| -> CallResult<bool> {
        let value = vec3_args(&x, &y, &z)?;
        Ok(api.write(&handle, |entity| apply(entity, value)))
    });
}

fn register_vec3_getter(engine: &mut Engine, api: &ScriptApi, name: &str, read: fn(&Entity) -> Vec3) {
    let api = api.clone();
    engine.register_fn(name, move |handle: Dynamic| api.read_vec3(&handle, read));
}

fn register_api(engine: &mut Engine, api: &ScriptApi) {
    let a = api.clone();
    engine.register_fn("GetObjectByName", move |name: ImmutableString| a.get_object_by_name(&name));
    let a = api.clone();
    engine.register_fn("GetSelf", move || a.get_self());

    register_vec3_setter(engine, api, "SetPosition", |entity, v| entity.set_position(v));
    register_vec3_getter(engine, api, "GetPosition", |entity| entity.position());
    register_vec3_setter(engine, api, "Move", |entity, v| {
        let position = entity.position() + v;
        entity.set_position(position);
    });
    register_vec3_setter(engine, api, "SetRotation", |entity, v| entity.set_rotation(v));
    register_vec3_getter(engine, api, "GetRotation", |entity| entity.rotation());
    register_vec3_setter(engine, api, "Rotate", |entity, v| {
        let rotation = entity.rotation() + v;
        entity.set_rotation(rotation);
    });
    register_vec3_setter(engine, api, "SetScale", |entity, v| entity.set_scale(v));
    register_vec3_getter(engine, api, "GetScale", |entity| entity.scale());
    register_vec3_setter(engine, api, "SetVelocity", |entity, v| entity.physics.velocity = v);
    register_vec3_getter(engine, api, "GetVelocity", |entity| entity.physics.velocity);
    register_vec3_setter(engine, api, "AddVelocity", |entity, v| entity.physics.velocity += v);
    register_vec3_setter(engine, api, "SetColor", |entity, v| entity.color = v);
    register_vec3_getter(engine, api, "GetColor", |entity| entity.color);

    let a = api.clone();
    engine.register_fn("SetVisible", move |handle: Dynamic, visible: bool| {
        a.write(&handle, |entity| entity.visible = visible)
    });
    let a = api.clone();
    engine.register_fn("IsVisible", move |handle: Dynamic| a.is_visible(&handle));

    let a = api.clone();
    engine.register_fn("IsKeyPressed", move |name: ImmutableString| a.is_key_pressed(&name));
    let a = api.clone();
    engine.register_fn("GetDeltaTime", move || a.delta_time());
    let a = api.clone();
    engine.register_fn("GetDistance", move |first: Dynamic, second: Dynamic| a.distance(&first, &second));

    let a = api.clone();
    engine.register_fn("Print", move |message: Dynamic| a.print(message.to_string()));
    let a = api.clone();
    engine.on_print(move |message| a.print(message.to_string()));

    let a = api.clone();
    engine.register_fn("PlayAnimation", move |handle: Dynamic, clip: ImmutableString| {
        a.play_animation(&handle, &clip)
    });
    let a = api.clone();
    engine.register_fn("StopAnimation", move |handle: Dynamic| a.stop_animation(&handle));
}

/// Every script is re-read and re-compiled on each run with a fresh scope, so no
/// script state survives between ticks.
pub struct ScriptHost {
    engine: Engine,
    api: ScriptApi,
}

impl ScriptHost {
    pub fn new(state: SharedState) -> Self {
        let api = ScriptApi::new(state);
        let mut engine = Engine::new();
        engine.set_fast_operators(true);
        register_api(&mut engine, &api);
        Self { engine, api }
    }

    pub fn run_all(&mut self) {
        let scripted: Vec<(EntityHandle, String, String)> = {
            let state = self.api.state.borrow();
            state
                .world
                .iter()
                .filter_map(|(handle, entity)| {
                    entity.script.as_ref().map(|script| (handle, entity.name.clone(), script.clone()))
                })
                .collect()
        };
        for (handle, name, script) in scripted {
            self.run_entity(handle, &name, Path::new(&script));
        }
    }

    /// Returns whether the body and any `OnUpdate` call completed without error.
    pub fn run_entity(&mut self, handle: EntityHandle, name: &str, script: &Path) -> bool {
        self.api.state.borrow_mut().current_self = Some(handle);
        let outcome = self.execute(script);
        self.api.state.borrow_mut().current_self = None;
        match outcome {
            Ok(()) => true,
            Err(err) => {
                self.api.report_error(name, format!("{err:#}"));
                false
            }
        }
    }

    fn execute(&self, script: &Path) -> Result<()> {
        let source =
            fs::read_to_string(script).with_context(|| format!("Reading script {}", script.display()))?;
        let ast = self.engine.compile(source).with_context(|| format!("Compiling {}", script.display()))?;
        let mut scope = Scope::new();
        self.engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|err| anyhow!("Running {}: {err}", script.display()))?;
        match update_entry_point(&ast) {
            UpdateEntryPoint::Missing => {}
            UpdateEntryPoint::Callable => {
                let options = CallFnOptions::new().eval_ast(false);
                self.engine
                    .call_fn_with_options::<Dynamic>(options, &mut scope, &ast, UPDATE_ENTRY_POINT, ())
                    .map_err(|err| anyhow!("Calling {UPDATE_ENTRY_POINT} in {}: {err}", script.display()))?;
            }
            UpdateEntryPoint::TakesParameters(count) => {
                log::warn!(
                    target: LOG_TARGET,
                    "{UPDATE_ENTRY_POINT} in {} takes {count} parameters and is not called",
                    script.display()
                );
            }
        }
        Ok(())
    }

    pub fn take_logs(&mut self) -> Vec<ScriptLogEntry> {
        std::mem::take(&mut *self.api.logs.borrow_mut())
    }

    pub fn eval_expression(&self, source: &str) -> Result<Dynamic> {
        self.engine.eval::<Dynamic>(source).map_err(|err| anyhow!("Evaluating expression: {err}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateEntryPoint {
    Missing,
    Callable,
    TakesParameters(usize),
}

fn update_entry_point(ast: &AST) -> UpdateEntryPoint {
    let mut found = UpdateEntryPoint::Missing;
    for f in ast.iter_functions().filter(|f| f.name == UPDATE_ENTRY_POINT) {
        if f.params.is_empty() {
            return UpdateEntryPoint::Callable;
        }
        found = UpdateEntryPoint::TakesParameters(f.params.len());
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EntityKind;
    use crate::runtime::RuntimeState;
    use std::io::Write;

    fn host_with(names: &[&str]) -> (ScriptHost, SharedState) {
        let state = RuntimeState::shared();
        state
            .borrow_mut()
            .world
            .replace(names.iter().map(|name| Entity::new(*name, EntityKind::Cube)).collect());
        (ScriptHost::new(state.clone()), state)
    }

    fn script_file(source: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".rhai").tempfile().expect("temp script");
        file.write_all(source.as_bytes()).expect("write script");
        file
    }

    #[test]
    fn setters_refresh_transform() {
        let (host, state) = host_with(&["Box"]);
        let applied = host.eval_expression("SetPosition(0, 1.0, 2, 3.5) && Rotate(0, 0, 90, 0)").unwrap();
        assert!(applied.as_bool().unwrap());
        let state = state.borrow();
        let entity = state.world.get(EntityHandle::new(0)).unwrap();
        assert_eq!(entity.position(), Vec3::new(1.0, 2.0, 3.5));
        assert_eq!(
            entity.world_transform(),
            crate::ecs::transform::compose_world(entity.position(), entity.rotation(), entity.scale())
        );
    }

    #[test]
    fn invalid_handles_return_sentinels_without_mutation() {
        let (host, state) = host_with(&["A", "B"]);
        for handle in ["-1", "2", "()"] {
            assert!(host.eval_expression(&format!("GetPosition({handle})")).unwrap().is_unit());
            assert!(!host.eval_expression(&format!("SetPosition({handle}, 9, 9, 9)")).unwrap().as_bool().unwrap());
            assert!(!host.eval_expression(&format!("IsVisible({handle})")).unwrap().as_bool().unwrap());
            let distance = host.eval_expression(&format!("GetDistance(0, {handle})")).unwrap();
            assert_eq!(distance.as_float().unwrap(), -1.0);
        }
        for (_, entity) in state.borrow().world.iter() {
            assert_eq!(entity.position(), Vec3::ZERO);
        }
    }

    #[test]
    fn missing_names_and_self_are_unit() {
        let (host, _state) = host_with(&["A"]);
        assert!(host.eval_expression("GetObjectByName(\"Nope\")").unwrap().is_unit());
        assert!(host.eval_expression("GetSelf()").unwrap().is_unit());
        assert_eq!(host.eval_expression("GetObjectByName(\"A\")").unwrap().as_int().unwrap(), 0);
    }

    #[test]
    fn self_is_set_only_while_running() {
        let (mut host, state) = host_with(&["Floor", "Door"]);
        let script = script_file("Print(GetSelf()); SetColor(GetSelf(), 1, 0, 0);");
        assert!(host.run_entity(EntityHandle::new(1), "Door", script.path()));
        assert_eq!(state.borrow().current_self, None);
        assert_eq!(host.take_logs(), vec![ScriptLogEntry::Print("1".to_string())]);
        assert_eq!(state.borrow().world.get(EntityHandle::new(1)).unwrap().color, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn failing_script_is_reported_and_clears_self() {
        let (mut host, state) = host_with(&["Broken"]);
        let script = script_file("let x = ;");
        assert!(!host.run_entity(EntityHandle::new(0), "Broken", script.path()));
        assert_eq!(state.borrow().current_self, None);
        let logs = host.take_logs();
        assert!(matches!(&logs[..], [ScriptLogEntry::Error { entity, .. }] if entity == "Broken"));
        assert!(host.take_logs().is_empty());
    }

    #[test]
    fn on_update_runs_once_after_body() {
        let (mut host, _state) = host_with(&["Ticker"]);
        let script = script_file("Print(\"body\");\nfn OnUpdate() { Print(\"update\"); }");
        assert!(host.run_entity(EntityHandle::new(0), "Ticker", script.path()));
        assert_eq!(
            host.take_logs(),
            vec![ScriptLogEntry::Print("body".into()), ScriptLogEntry::Print("update".into())]
        );
    }

    #[test]
    fn on_update_with_parameters_is_skipped() {
        let (mut host, _state) = host_with(&["Ticker"]);
        let compiled = host.engine.compile("fn OnUpdate(dt, extra) { Print(\"update\"); }").unwrap();
        assert_eq!(update_entry_point(&compiled), UpdateEntryPoint::TakesParameters(2));
        let compiled = host.engine.compile("fn OnUpdate(dt) {}\nfn OnUpdate() {}").unwrap();
        assert_eq!(update_entry_point(&compiled), UpdateEntryPoint::Callable);
        assert_eq!(update_entry_point(&host.engine.compile("let x = 1;").unwrap()), UpdateEntryPoint::Missing);

        let script = script_file("Print(\"body\");\nfn OnUpdate(dt) { Print(\"update\"); }");
        assert!(host.run_entity(EntityHandle::new(0), "Ticker", script.path()));
        assert_eq!(host.take_logs(), vec![ScriptLogEntry::Print("body".into())]);
    }

    #[test]
    fn non_numeric_argument_is_a_script_error() {
        let (host, _state) = host_with(&["A"]);
        assert!(host.eval_expression("SetPosition(0, \"x\", 0, 0)").is_err());
    }
}
