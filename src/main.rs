use color_eyre::Result;
use eyre::eyre;
use ketra_n4::n4::{Ketra, KetraOptions};
use ketra_n4::protocols::discovery::discover_n4_device;
use ketra_n4::settings::read_settings;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init();

    let settings = read_settings()?;
    let n4 = settings.n4;

    let host = match (n4.host, n4.serial_number) {
        (Some(host), _) => host,
        (None, Some(serial)) => discover_n4_device(&serial).await?,
        (None, None) => return Err(eyre!("settings need either n4.host or n4.serial_number")),
    };

    let options = KetraOptions {
        noop_set_state: n4.noop_set_state.unwrap_or(false),
        disable_certificate_verification: n4.disable_certificate_verification.unwrap_or(true),
        cache_dir: n4.cache_dir.map(Into::into),
    };

    let mut ketra = Ketra::new(&host, &n4.password, &n4.area, options)?;
    ketra.load_db(n4.disable_cache.unwrap_or(false)).await?;

    if let Some(area) = ketra.area() {
        println!("{area}");
    }
    for output in ketra.outputs() {
        println!("{output}");
        println!("  rgb = {:?}", output.rgb());
        println!("  hs = {:?}", output.hs());
    }

    Ok(())
}
