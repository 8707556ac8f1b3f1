use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var("REDNOTE_BASE_URL")
            && !base_url.is_empty()
        {
            self.api.base_url = base_url;
        }

        if let Ok(timeout_str) = std::env::var("REDNOTE_TIMEOUT_SECS")
            && let Ok(timeout) = timeout_str.parse::<u64>()
            && timeout > 0
        {
            self.api.timeout_secs = timeout;
        }

        if let Ok(path) = std::env::var("REDNOTE_STORAGE_PATH")
            && !path.is_empty()
        {
            self.storage.path = Some(path);
        }

        if let Ok(level) = std::env::var("REDNOTE_LOG_LEVEL")
            && !level.is_empty()
        {
            self.log.level = level;
        }
    }
}
