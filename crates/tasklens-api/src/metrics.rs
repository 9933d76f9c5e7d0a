use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use std::sync::Once;
use tracing::warn;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref TASKS_CREATED_TOTAL: IntCounter =
        IntCounter::new("tasks_created_total", "Total number of tasks created")
            .expect("valid metric definition");

    pub static ref CONTEXTS_CREATED_TOTAL: IntCounter =
        IntCounter::new("contexts_created_total", "Total number of context entries created")
            .expect("valid metric definition");

    pub static ref CONTEXTS_PROCESSED_TOTAL: IntCounter =
        IntCounter::new("contexts_processed_total", "Total number of context entries processed")
            .expect("valid metric definition");

    pub static ref SUGGESTION_REQUESTS_TOTAL: IntCounter =
        IntCounter::new("suggestion_requests_total", "Total number of task list suggestion requests")
            .expect("valid metric definition");
}

static REGISTER: Once = Once::new();

/// Safe to call more than once; only the first call registers.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors = [
            TASKS_CREATED_TOTAL.clone(),
            CONTEXTS_CREATED_TOTAL.clone(),
            CONTEXTS_PROCESSED_TOTAL.clone(),
            SUGGESTION_REQUESTS_TOTAL.clone(),
        ];
        for counter in collectors {
            if let Err(e) = REGISTRY.register(Box::new(counter)) {
                warn!("failed to register metric: {}", e);
            }
        }

        #[cfg(target_os = "linux")]
        if let Err(e) = REGISTRY.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        )) {
            warn!("failed to register process collector: {}", e);
        }
    });
}

pub fn render() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_counters() {
        register_metrics();
        register_metrics();
        TASKS_CREATED_TOTAL.inc();
        let text = render().unwrap();
        assert!(text.contains("tasks_created_total"));
        assert!(text.contains("suggestion_requests_total"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn render_includes_process_metrics() {
        register_metrics();
        let text = render().unwrap();
        assert!(text.contains("process_cpu_seconds_total"));
        assert!(text.contains("process_resident_memory_bytes"));
    }
}
