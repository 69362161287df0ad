#[cfg(target_os = "espidf")]
fn main() {
    esp_hello_peripheral::svc::sys::link_patches();
    esp_hello_peripheral::svc::log::EspLogger::initialize_default();

    if let Err(err) = firmware::run() {
        log::error!("Error: {:?}", err);
    }
}

#[cfg(target_os = "espidf")]
mod firmware {
    use esp_hello_peripheral::{
        ble::Ble, config::PeripheralConfig, event_loop::EventLoop, peripheral::Peripheral,
        svc::hal::prelude::Peripherals,
    };

    pub fn run() -> anyhow::Result<()> {
        let peripherals = Peripherals::take()?;
        let config = PeripheralConfig::default();

        let peripheral = Peripheral::new(config.clone())?;
        let ble = Ble::new(peripherals.modem, &config)?;

        let event_loop = EventLoop::spawn(ble, peripheral, |ble, events| ble.subscribe(events))?;
        log::info!("Bluetooth device is ready");

        // Callbacks keep their senders for the lifetime of the stack, so this
        // only returns if the loop thread dies.
        event_loop.join()?;

        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    pretty_env_logger::init();
    log::error!("esp-hello-peripheral drives the ESP-IDF Bluedroid stack and only runs on ESP32 targets");
}
