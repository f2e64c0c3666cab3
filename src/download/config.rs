use crate::url::parse_url;

pub const WIFI_SSID_MAX: usize = 32;
pub const WIFI_PSK_MIN: usize = 8;
pub const WIFI_PSK_MAX: usize = 64;

pub const DEFAULT_WLAN_SSID: &str = "DEMO_AP";
pub const DEFAULT_WLAN_PSK: &str = "12345678";
pub const DEFAULT_HTTP_FILE_URL: &str =
    "http://www.microchip.com/Images/45093A-SmartConnectWINC1500_E_US_101014_web.pdf";

// Largest response the HTTP engine hands over together with the headers.
pub const DEFAULT_BUFFER_MAX: usize = 1446;
pub const BUFFER_MIN: usize = 64;
// First watchdog window after boot; later windows use the recurring value.
pub const INITIAL_WATCHDOG_DEFAULT_SECS: u32 = 40;
pub const WATCHDOG_DEFAULT_SECS: u32 = 60;
pub const HEARTBEAT_DEFAULT_MS: u32 = 1_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    Open,
    Wep,
    WpaPsk,
}

impl AuthMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Wep => "wep",
            Self::WpaPsk => "wpa-psk",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        if label.eq_ignore_ascii_case("open") || label.eq_ignore_ascii_case("none") {
            Some(Self::Open)
        } else if label.eq_ignore_ascii_case("wep") {
            Some(Self::Wep)
        } else if label.eq_ignore_ascii_case("wpa-psk")
            || label.eq_ignore_ascii_case("wpa")
            || label.eq_ignore_ascii_case("wpa2")
        {
            Some(Self::WpaPsk)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: &'static str,
    pub auth: AuthMode,
    pub passphrase: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    EmptySsid,
    SsidTooLong,
    PassphraseLength,
    UnknownAuthMode,
    UnsupportedUrl,
    BufferTooSmall,
    BufferTooLarge,
}

impl ConfigError {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptySsid => "empty ssid",
            Self::SsidTooLong => "ssid too long",
            Self::PassphraseLength => "passphrase length invalid for auth mode",
            Self::UnknownAuthMode => "unknown auth mode",
            Self::UnsupportedUrl => "url must be http://host[:port]/path",
            Self::BufferTooSmall => "inline buffer too small",
            Self::BufferTooLarge => "inline buffer larger than engine window",
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitError {
    Config(ConfigError),
    Radio,
    WifiDriver,
}

impl InitError {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config(err) => err.as_str(),
            Self::Radio => "radio init failed",
            Self::WifiDriver => "wifi driver init failed",
        }
    }
}

impl From<ConfigError> for InitError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl core::fmt::Display for InitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DownloadConfig {
    pub credentials: WifiCredentials,
    pub url: &'static str,
    pub buffer_max: usize,
    pub initial_watchdog_secs: u32,
    pub watchdog_secs: u32,
    pub heartbeat_ms: u32,
    /// `None` keeps the watchdog as the only stagnation detector.
    pub stall_timeout_ms: Option<u32>,
}

impl DownloadConfig {
    pub const fn defaults() -> Self {
        Self {
            credentials: WifiCredentials {
                ssid: DEFAULT_WLAN_SSID,
                auth: AuthMode::WpaPsk,
                passphrase: DEFAULT_WLAN_PSK,
            },
            url: DEFAULT_HTTP_FILE_URL,
            buffer_max: DEFAULT_BUFFER_MAX,
            initial_watchdog_secs: INITIAL_WATCHDOG_DEFAULT_SECS,
            watchdog_secs: WATCHDOG_DEFAULT_SECS,
            heartbeat_ms: HEARTBEAT_DEFAULT_MS,
            stall_timeout_ms: None,
        }
    }

    /// Configuration baked in at build time from `WIFETCH_*` variables.
    pub fn compiled() -> Result<Self, ConfigError> {
        let mut config = Self::defaults();
        if let Some(ssid) = option_env!("WIFETCH_WLAN_SSID") {
            config.credentials.ssid = ssid;
        }
        if let Some(label) = option_env!("WIFETCH_WLAN_AUTH") {
            config.credentials.auth =
                AuthMode::from_label(label).ok_or(ConfigError::UnknownAuthMode)?;
        }
        if let Some(psk) = option_env!("WIFETCH_WLAN_PSK") {
            config.credentials.passphrase = psk;
        }
        if let Some(url) = option_env!("WIFETCH_HTTP_URL") {
            config.url = url;
        }
        Ok(config)
    }

    pub const fn sanitized(self) -> Self {
        let initial_watchdog_secs = clamp_u32(self.initial_watchdog_secs, 5, 3_600);
        let watchdog_secs = clamp_u32(self.watchdog_secs, 5, 3_600);
        let heartbeat_ms = clamp_u32(self.heartbeat_ms, 100, 60_000);
        let stall_timeout_ms = match self.stall_timeout_ms {
            Some(ms) => Some(clamp_u32(ms, 1_000, 3_600_000)),
            None => None,
        };
        Self {
            initial_watchdog_secs,
            watchdog_secs,
            heartbeat_ms,
            stall_timeout_ms,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let credentials = &self.credentials;
        if credentials.ssid.is_empty() {
            return Err(ConfigError::EmptySsid);
        }
        if credentials.ssid.len() > WIFI_SSID_MAX {
            return Err(ConfigError::SsidTooLong);
        }
        let psk_len = credentials.passphrase.len();
        let psk_ok = match credentials.auth {
            AuthMode::Open => true,
            AuthMode::Wep => matches!(psk_len, 5 | 10 | 13 | 26),
            AuthMode::WpaPsk => (WIFI_PSK_MIN..=WIFI_PSK_MAX).contains(&psk_len),
        };
        if !psk_ok {
            return Err(ConfigError::PassphraseLength);
        }
        parse_url(self.url).map_err(|_| ConfigError::UnsupportedUrl)?;
        if self.buffer_max < BUFFER_MIN {
            return Err(ConfigError::BufferTooSmall);
        }
        if self.buffer_max > DEFAULT_BUFFER_MAX {
            return Err(ConfigError::BufferTooLarge);
        }
        Ok(())
    }
}

const fn clamp_u32(value: u32, min: u32, max: u32) -> u32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}
