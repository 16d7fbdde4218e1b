use scene_player::cli::CliOverrides;
use scene_player::config::GameConfig;
use scene_player::scripts::ScriptLogEntry;
use scene_player::time::Time;
use scene_player::SceneRuntime;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match CliOverrides::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            log::error!("[cli] {err}");
            std::process::exit(2);
        }
    };

    let mut config = GameConfig::load_or_default(cli.config_path());
    let overrides = cli.config_overrides();
    if !overrides.is_empty() {
        log::info!("CLI overrides: {}", overrides.applied_fields().join(", "));
    }
    config.apply_overrides(&overrides);
    log::info!("Starting {} with scene {}", config.game_name, config.scene_file.display());

    let mut runtime = SceneRuntime::from_config(&config);
    if let Err(err) = runtime.load_scene(&config.scene_file) {
        log::error!("Failed to load scene: {err:#}");
    }

    let mut time = Time::new();
    let mut script_errors = 0usize;
    for _ in 0..cli.ticks() {
        time.tick();
        let raw_dt = cli.fixed_dt().unwrap_or_else(|| time.delta_seconds());
        runtime.tick(raw_dt);
        script_errors += runtime
            .take_script_logs()
            .iter()
            .filter(|entry| matches!(entry, ScriptLogEntry::Error { .. }))
            .count();
    }

    let frame = runtime.render_frame();
    log::info!(
        "Ran {} ticks in {:.2}s: {} entities, {} draws, {} lights, {} script errors",
        runtime.ticks(),
        time.elapsed_seconds(),
        runtime.world().count(),
        frame.draws.len(),
        frame.lights.len(),
        script_errors
    );
}
