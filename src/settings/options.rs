use std::time::Duration;

/// Tunables of the scanner itself, as opposed to the user's `Settings`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ScanOptions {
    /// How long a mutation batch waits, in milliseconds, before it is
    /// processed. Each new batch restarts the wait.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Canonical hosts whose notices go inside the hidden element rather
    /// than before it.
    #[serde(default = "default_put_inside_hosts")]
    pub put_inside_hosts: Vec<String>,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_put_inside_hosts() -> Vec<String> {
    vec![String::from("twitter.com")]
}

impl Default for ScanOptions {
    fn default() -> ScanOptions {
        ScanOptions {
            debounce_ms: default_debounce_ms(),
            put_inside_hosts: default_put_inside_hosts(),
        }
    }
}

impl ScanOptions {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn puts_inside(&self, host: Option<&str>) -> bool {
        match host {
            Some(host) => self.put_inside_hosts.iter().any(|known| known == host),
            None => false,
        }
    }
}
