pub struct Utils;

impl Utils {
    /// Extract the port from an `address:port` token.
    ///
    /// Splits on the last colon so every address form works:
    /// - IPv4: "127.0.0.1:3000" or "*:8080"
    /// - IPv6: "\[::1]:3000" or "\[fe80::1]:8080"
    pub fn port_from_address(address: &str) -> Option<u16> {
        let last_colon = address.rfind(':')?;
        address[last_colon + 1..].parse().ok()
    }

    /// Undo lsof's escaping of special characters in command names.
    pub fn unescape_process_name(name: &str) -> String {
        name.replace("\\x20", " ") // Space
            .replace("\\x2f", "/") // Slash
    }
}
