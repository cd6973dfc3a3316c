use std::sync::Arc;

use actix_extensible_rate_limit::backend::memory::InMemoryBackend;
use actix_extensible_rate_limit::RateLimiter;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use fgame::config::ServerArgs;
use fgame::infra::state::build_state;
use fgame::middleware::access_log::AccessLog;
use fgame::middleware::rate_limit::{upgrade_rate_limit_config, MessageLimiter};
use fgame::routes;
use fgame::services::spawn_housekeeping;
use fgame::state::security_config::SecurityConfig;
use fgame::ws::session::upgrade;
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = ServerArgs::parse();
    telemetry::init_tracing(args.log_format);

    let config = match args.game_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    let questions = match args.question_bank() {
        Ok(questions) => questions,
        Err(e) => {
            eprintln!("❌ Failed to load questions: {e}");
            std::process::exit(1);
        }
    };

    info!(
        addr = %args.addr,
        max_players = config.max_players,
        max_score = config.max_score,
        timeout_multiplier = config.timeout_multiplier,
        questions = questions.len(),
        "initializing server"
    );

    // Signing secret lives for the process lifetime.
    let app_state = match build_state()
        .with_config(config.clone())
        .with_questions(questions)
        .with_security(SecurityConfig::generate())
        .with_limiter(Arc::new(MessageLimiter::collected(
            config.message_burst,
            config.message_window,
            config.gc_interval,
        )))
        .build()
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            eprintln!("❌ Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    let _housekeeping = spawn_housekeeping(app_state.directory().clone(), &config);

    let data = web::Data::new(app_state);
    let upgrade_backend = InMemoryBackend::builder().build();

    println!("🚀 Starting fgame on http://{}", args.addr);

    HttpServer::new(move || {
        let upgrade_limiter =
            RateLimiter::builder(upgrade_backend.clone(), upgrade_rate_limit_config().build())
                .add_headers()
                .build();

        App::new()
            .wrap(AccessLog)
            .app_data(data.clone())
            .service(
                web::scope("/ws")
                    .wrap(upgrade_limiter)
                    .route("", web::get().to(upgrade)),
            )
            .service(web::scope("/health").configure(routes::health::configure_routes))
    })
    .bind(args.addr.as_str())?
    .run()
    .await
}
