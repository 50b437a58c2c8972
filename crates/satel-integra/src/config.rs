use std::time::Duration;

/// Default plaintext TCP port the panel's ETHM module listens on.
pub const DEFAULT_TCP_PORT: u16 = 7094;
/// Default port for the encrypted variant (requires an integration key).
pub const DEFAULT_TCP_PORT_ENCRYPTED: u16 = 17094;

/// Which transport a [`ClientConfig`] connects over.
#[derive(Debug, Clone)]
pub enum Endpoint {
    Tcp { host: String, port: u16 },
    Serial { device: String, baud: u32 },
}

/// Everything needed to open and maintain one connection to a panel:
/// transport endpoint, optional encryption, timeouts, reconnect policy, and
/// the default user/prefix code used when a call doesn't override it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Endpoint,
    pub integration_key: Option<String>,
    pub conn_timeout: Duration,
    pub resp_timeout: Duration,
    pub keep_alive: Duration,
    pub auto_reconnect: bool,
    /// Negative means unlimited retries, zero means don't retry at all.
    pub retries: i32,
    pub user_code: String,
    pub prefix_code: String,
}

impl ClientConfig {
    /// A plaintext TCP connection to `host:port`.
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::new(Endpoint::Tcp { host: host.into(), port })
    }

    /// An encrypted TCP connection on the default encrypted port, keyed with
    /// `integration_key`.
    pub fn tcp_encrypted(host: impl Into<String>, integration_key: impl Into<String>) -> Self {
        Self::new(Endpoint::Tcp { host: host.into(), port: DEFAULT_TCP_PORT_ENCRYPTED })
            .with_integration_key(integration_key)
    }

    pub fn serial(device: impl Into<String>, baud: u32) -> Self {
        Self::new(Endpoint::Serial { device: device.into(), baud })
    }

    fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            integration_key: None,
            conn_timeout: Duration::from_secs(5),
            resp_timeout: Duration::from_secs(5),
            keep_alive: Duration::from_secs(10),
            auto_reconnect: true,
            retries: -1,
            user_code: String::new(),
            prefix_code: String::new(),
        }
    }

    pub fn with_integration_key(mut self, key: impl Into<String>) -> Self {
        self.integration_key = Some(key.into());
        self
    }

    pub fn with_conn_timeout(mut self, timeout: Duration) -> Self {
        self.conn_timeout = timeout;
        self
    }

    pub fn with_resp_timeout(mut self, timeout: Duration) -> Self {
        self.resp_timeout = timeout;
        self
    }

    pub fn with_keep_alive(mut self, interval: Duration) -> Self {
        self.keep_alive = interval;
        self
    }

    pub fn with_auto_reconnect(mut self, auto_reconnect: bool) -> Self {
        self.auto_reconnect = auto_reconnect;
        self
    }

    /// Negative disables the limit, `0` disables reconnecting entirely.
    pub fn with_retries(mut self, retries: i32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_user_code(mut self, user_code: impl Into<String>) -> Self {
        self.user_code = user_code.into();
        self
    }

    pub fn with_prefix_code(mut self, prefix_code: impl Into<String>) -> Self {
        self.prefix_code = prefix_code.into();
        self
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tcp_encrypted_defaults_to_the_encrypted_port_and_sets_the_key() {
        let config = ClientConfig::tcp_encrypted("10.0.0.5", "abcdefghijkl");
        match config.endpoint {
            Endpoint::Tcp { port, .. } => assert_eq!(port, DEFAULT_TCP_PORT_ENCRYPTED),
            Endpoint::Serial { .. } => panic!("expected tcp"),
        }
        assert_eq!(config.integration_key.as_deref(), Some("abcdefghijkl"));
    }

    #[test]
    fn plain_tcp_has_no_integration_key_by_default() {
        let config = ClientConfig::tcp("10.0.0.5", DEFAULT_TCP_PORT);
        assert!(config.integration_key.is_none());
        assert_eq!(config.retries, -1);
    }

    #[test]
    fn serial_config_uses_the_serial_endpoint() {
        let config = ClientConfig::serial("/dev/ttyUSB0", 19200);
        match config.endpoint {
            Endpoint::Serial { device, baud } => {
                assert_eq!(device, "/dev/ttyUSB0");
                assert_eq!(baud, 19200);
            }
            Endpoint::Tcp { .. } => panic!("expected serial"),
        }
    }
}
