use anyhow::Result;
use std::path::Path;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

use karion::config::Config;
use karion::intro::{assets, IntroOutcome, Sequencer};
use karion::logging::{json_log, obj, v_num, v_str};
use karion::risk::RiskService;
use karion::styles::install_global_styles;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    json_log(
        "startup",
        obj(&[
            ("risk_source", v_str(&format!("{:?}", cfg.risk_source))),
            ("intro", serde_json::json!(cfg.intro_enabled)),
        ]),
    );

    install_global_styles();

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        });
    }

    if cfg.intro_enabled {
        play_intro(&cfg, &shutdown).await?;
    }

    let source = cfg.risk_source.build(&cfg)?;
    let service = RiskService::from_config(source, &cfg);

    loop {
        match service.get_risk_analysis_with_cancel(&shutdown).await {
            Ok(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot)?),
            Err(err) => json_log(
                "risk_unavailable",
                obj(&[
                    ("source", v_str(service.source_name())),
                    ("error", v_str(&err.to_string())),
                ]),
            ),
        }

        if cfg.risk_refresh_secs == 0 || shutdown.is_cancelled() {
            break;
        }
        tokio::select! {
            () = shutdown.cancelled() => break,
            () = sleep(Duration::from_secs(cfg.risk_refresh_secs)) => {}
        }
    }

    json_log("shutdown", obj(&[("msg", v_str("bye"))]));
    Ok(())
}

async fn play_intro(cfg: &Config, shutdown: &CancellationToken) -> Result<()> {
    let missing = assets::missing_assets(Path::new(&cfg.asset_dir));
    if !missing.is_empty() {
        let paths: Vec<_> = missing.iter().map(|p| v_str(&p.to_string_lossy())).collect();
        json_log("intro_assets", obj(&[("missing", serde_json::Value::Array(paths))]));
    }

    let sequencer = Sequencer::new();
    let handle = sequencer.start(|| {
        json_log("intro", obj(&[("msg", v_str("handing control back"))]));
    })?;
    let runtime = karion::intro::TOTAL_RUNTIME.as_millis() as f64;
    json_log("intro", obj(&[("runtime_ms", v_num(runtime))]));

    // Losing the race drops the wait future and with it the handle, which cancels the run.
    let outcome = tokio::select! {
        () = shutdown.cancelled() => IntroOutcome::Cancelled,
        outcome = handle.wait() => outcome,
    };
    json_log("intro", obj(&[("outcome", v_str(&format!("{:?}", outcome)))]));
    Ok(())
}
