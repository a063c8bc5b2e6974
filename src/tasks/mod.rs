//! Background scheduled tasks for the application.
//!
//! Call `spawn_all` once during startup; it detaches the order lifecycle sweeps and
//! returns immediately.

pub mod order_sweeper;

pub use order_sweeper::{OrderSweeper, SweepFailure, SweepReport, resolve_system_actor, sweep};

/// Spawn all background tasks. Each sweep runs on its own timer.
pub fn spawn_all(sweeper: OrderSweeper, interval_secs: u64) {
    let interval = std::time::Duration::from_secs(interval_secs.max(1));

    // 超时未付款订单自动取消
    {
        let svc = sweeper.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = svc.cancel_expired_pending_payments().await {
                    log::error!("Failed to sweep pending-payment orders: {e:?}");
                }
                tokio::time::sleep(interval).await;
            }
        });
    }

    // 已发货订单超时自动确认收货
    {
        let svc = sweeper;
        tokio::spawn(async move {
            loop {
                if let Err(e) = svc.confirm_stale_shipments().await {
                    log::error!("Failed to sweep shipped orders: {e:?}");
                }
                tokio::time::sleep(interval).await;
            }
        });
    }
}
