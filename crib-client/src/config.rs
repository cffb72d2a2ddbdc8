use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::registration::RegistrationPolicy;

/// Floor for the HTTP polling interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub backend_url: String,
    pub poll_interval: Duration,
    pub email_domain: String,
    pub school_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: String::from("http://localhost:8000"),
            poll_interval: Duration::from_millis(1000),
            email_domain: String::from("@stanford.edu"),
            school_name: String::from("Stanford"),
        }
    }
}

impl ClientConfig {
    pub fn load() -> Self {
        let defaults = Self::default();
        Self {
            backend_url: try_load("CRIB_BACKEND_URL", defaults.backend_url),
            poll_interval: poll_interval(try_load("CRIB_POLL_MS", 1000u64)),
            email_domain: try_load("CRIB_EMAIL_DOMAIN", defaults.email_domain),
            school_name: try_load("CRIB_SCHOOL_NAME", defaults.school_name),
        }
    }

    pub fn registration_policy(&self) -> RegistrationPolicy {
        RegistrationPolicy {
            email_domain: self.email_domain.clone(),
            school_name: self.school_name.clone(),
            ..RegistrationPolicy::default()
        }
    }
}

fn poll_interval(millis: u64) -> Duration {
    let interval = Duration::from_millis(millis);
    if interval < MIN_POLL_INTERVAL {
        warn!("CRIB_POLL_MS={millis} is below the minimum, using {}ms", MIN_POLL_INTERVAL.as_millis());
        return MIN_POLL_INTERVAL;
    }
    interval
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value: {e}, using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_interval_has_a_floor() {
        assert_eq!(poll_interval(0), MIN_POLL_INTERVAL);
        assert_eq!(poll_interval(20), MIN_POLL_INTERVAL);
        assert_eq!(poll_interval(1500), Duration::from_millis(1500));
    }

    #[test]
    fn policy_follows_config() {
        let config = ClientConfig {
            email_domain: String::from("@mit.edu"),
            school_name: String::from("MIT"),
            ..ClientConfig::default()
        };
        let policy = config.registration_policy();
        assert_eq!(policy.email_domain, "@mit.edu");
        assert_eq!(policy.school_name, "MIT");
        assert_eq!(policy.min_password_len, 6);
    }
}
