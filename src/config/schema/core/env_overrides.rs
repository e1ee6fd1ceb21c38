use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("REPLICATE_API_TOKEN")
            && !token.trim().is_empty()
        {
            self.generation.api_token = Some(token.trim().to_string());
        }

        if let Ok(version) = std::env::var("DESIGNSYNC_MODEL_VERSION")
            && !version.is_empty()
        {
            self.generation.model_version = version;
        }

        if let Ok(port_str) =
            std::env::var("DESIGNSYNC_GATEWAY_PORT").or_else(|_| std::env::var("PORT"))
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Ok(host) =
            std::env::var("DESIGNSYNC_GATEWAY_HOST").or_else(|_| std::env::var("HOST"))
            && !host.is_empty()
        {
            self.gateway.host = host;
        }

        if let Ok(url) = std::env::var("SUPABASE_URL")
            && !url.is_empty()
        {
            self.persistence.remote_url = Some(url);
        }

        if let Ok(key) = std::env::var("SUPABASE_ANON_KEY")
            && !key.is_empty()
        {
            self.persistence.remote_key = Some(key);
        }

        if let Ok(app_id) = std::env::var("DESIGNSYNC_APP_ID")
            && !app_id.is_empty()
        {
            self.persistence.app_id = app_id;
        }
    }
}
