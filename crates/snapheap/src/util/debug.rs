//! Debug Utilities
//!
//! Helpers for rendering snapshot addresses in diagnostics.

/// Debug formatter for snapshot addresses
pub fn format_address(address: u64) -> String {
    format!("0x{:016X}", address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_address() {
        assert_eq!(format_address(0x1018), "0x0000000000001018");
    }
}
