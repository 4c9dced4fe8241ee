use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub api: ServiceStatus,
    pub db: ServiceStatus,
}

/// Result of `health.check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub services: ServiceHealth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    pub fn healthy(timestamp: DateTime<Utc>) -> Self {
        Self {
            status: HealthStatus::Ok,
            timestamp,
            services: ServiceHealth {
                api: ServiceStatus::Healthy,
                db: ServiceStatus::Healthy,
            },
            error: None,
        }
    }

    /// API is up but the database did not answer.
    pub fn database_down(timestamp: DateTime<Utc>, error: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Degraded,
            timestamp,
            services: ServiceHealth {
                api: ServiceStatus::Healthy,
                db: ServiceStatus::Unhealthy,
            },
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_wire_format() {
        let value = serde_json::to_value(HealthResponse::healthy(Utc::now())).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["services"]["db"], "healthy");
        assert!(value.get("error").is_none());

        let value =
            serde_json::to_value(HealthResponse::database_down(Utc::now(), "refused")).unwrap();
        assert_eq!(value["status"], "degraded");
        assert_eq!(value["services"]["db"], "unhealthy");
        assert_eq!(value["error"], "refused");
    }
}
