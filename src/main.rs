use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use tokoku_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks::{self, OrderSweeper},
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml()
        .map_err(|e| std::io::Error::other(format!("Failed to load configuration: {e}")))?;

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to connect to database: {e}")))?;

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to run migrations: {e}")))?;

    let pool = Arc::new(pool);
    let jwt_service = JwtService::new(&config.jwt.secret);

    // 创建服务
    let promotion_service = PromotionService::new(Arc::clone(&pool));
    let product_promotion_service = ProductPromotionService::new(Arc::clone(&pool));
    let voucher_service = VoucherService::new(Arc::clone(&pool));
    let checkout_service = CheckoutService::new(Arc::clone(&pool));
    let order_service = OrderService::new(Arc::clone(&pool));

    // 启动订单定时清理任务，系统操作者只在启动时解析一次
    if config.sweeper.enabled {
        match tasks::resolve_system_actor(&pool, &config.sweeper).await {
            Ok(Some(actor)) => {
                log::info!("Order sweeper running as user {}", actor.id);
                let sweeper =
                    OrderSweeper::new(order_service.clone(), actor, config.sweeper.clone());
                tasks::spawn_all(sweeper, config.sweeper.interval_secs);
            }
            Ok(None) => {
                log::error!("No active super admin found, order sweeper not started");
            }
            Err(e) => {
                log::error!("Failed to resolve sweeper system actor: {e:?}");
            }
        }
    } else {
        log::info!("Order sweeper disabled by configuration");
    }

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let sweeper_config = config.sweeper.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(web::Data::new(promotion_service.clone()))
            .app_data(web::Data::new(product_promotion_service.clone()))
            .app_data(web::Data::new(voucher_service.clone()))
            .app_data(web::Data::new(checkout_service.clone()))
            .app_data(web::Data::new(order_service.clone()))
            .app_data(web::Data::new(sweeper_config.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api")
                    .configure(handlers::promotion_config)
                    .configure(handlers::product_promotion_config)
                    .configure(handlers::sweep_config)
                    .configure(handlers::voucher_config)
                    .configure(handlers::checkout_config)
                    .configure(handlers::order_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
