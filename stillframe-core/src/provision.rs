//! Setup network provisioning
//!
//! With no stored credentials the device brings up its own setup
//! network. These helpers build the network name, the password and the
//! join payload phones scan to connect.

use core::fmt::Write;

use heapless::String;

use crate::config::MAX_SYMBOL_TEXT;
use crate::traits::RandomSource;

pub const SETUP_SSID_PREFIX: &str = "ImageLoad";

/// Prefix plus three digits.
pub const MAX_SSID: usize = SETUP_SSID_PREFIX.len() + 3;

pub const PASSWORD_DIGITS: usize = 8;

fn push_digits<const N: usize, R: RandomSource>(out: &mut String<N>, rng: &mut R, count: usize) {
    for _ in 0..count {
        let digit = rng.random_digit() % 10;
        let _ = out.push((b'0' + digit) as char);
    }
}

/// Setup network name, distinguishable across neighboring devices.
pub fn setup_ssid<R: RandomSource>(rng: &mut R) -> String<MAX_SSID> {
    let mut ssid = String::new();
    let _ = ssid.push_str(SETUP_SSID_PREFIX);
    push_digits(&mut ssid, rng, 3);
    ssid
}

/// Fresh numeric password for the setup network.
pub fn setup_password<R: RandomSource>(rng: &mut R) -> String<PASSWORD_DIGITS> {
    let mut password = String::new();
    push_digits(&mut password, rng, PASSWORD_DIGITS);
    password
}

/// Join payload in the WIFI scheme phone cameras understand.
pub fn wifi_qr_payload(ssid: &str, password: &str) -> String<MAX_SYMBOL_TEXT> {
    let mut payload = String::new();
    let _ = write!(payload, "WIFI:S:{ssid};T:WPA;P:{password};H:;;");
    payload
}
