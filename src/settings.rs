use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct N4Settings {
    /// Address of the N4; discovered via `serial_number` when absent.
    pub host: Option<String>,
    pub serial_number: Option<String>,
    pub password: String,
    pub area: String,
    pub noop_set_state: Option<bool>,
    pub disable_certificate_verification: Option<bool>,
    pub disable_cache: Option<bool>,
    pub cache_dir: Option<String>,
}

#[derive(Clone, Deserialize, Debug)]
pub struct Settings {
    pub n4: N4Settings,
}

pub fn read_settings() -> Result<Settings, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name("Settings"))
        .build()?
        .try_deserialize::<Settings>()
}
