//! Connector property name encoding.
//!
//! Wire property names are dotted keys (`account.lock.handler.Time`). Form
//! layers and CLI flag names cannot always carry dots, so names travel through
//! them dash-encoded and are decoded back right before a payload is built.

/// Encode a dotted wire property name for use as a form field key.
pub fn encode_property_name(name: &str) -> String {
    name.replace('.', "-")
}

/// Decode a dash-encoded field key back into its dotted wire name.
pub fn decode_property_name(encoded: &str) -> String {
    encoded.replace('-', ".")
}
