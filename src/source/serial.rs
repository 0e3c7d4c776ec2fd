//! Serial transport for microcontroller line feeds.
//!
//! Only compiled with the `serial` feature. The port is opened 8N1 without
//! flow control; reads time out so the line source can notice a stop request.

use crate::config::SerialConfig;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::BufReader;
use std::thread;

/// Open the configured port and wait for the device to settle.
///
/// Many boards reset when the port opens; the settle delay gives them time
/// to boot before the first line is expected.
pub fn open_serial(
    config: &SerialConfig,
) -> Result<BufReader<Box<dyn SerialPort>>, serialport::Error> {
    let port = serialport::new(&config.port, config.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(config.read_timeout)
        .open()?;

    tracing::info!(port = %config.port, baud = config.baud_rate, "serial port opened");

    if !config.settle_delay.is_zero() {
        tracing::info!(
            delay_ms = config.settle_delay.as_millis() as u64,
            "waiting for device to settle"
        );
        thread::sleep(config.settle_delay);
    }

    Ok(BufReader::new(port))
}

/// Names of the serial ports present on this machine.
pub fn available_ports() -> Result<Vec<String>, serialport::Error> {
    Ok(serialport::available_ports()?
        .into_iter()
        .map(|info| info.port_name)
        .collect())
}
