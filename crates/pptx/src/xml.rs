//! Small helpers shared by the OOXML part readers.

use quick_xml::events::BytesStart;

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Value of the attribute whose local name is `key`, ignoring any prefix.
pub(crate) fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| local_name(a.key.as_ref()) == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

/// Value of a namespaced attribute such as `r:id`, skipping an unprefixed
/// attribute with the same local name.
pub(crate) fn prefixed_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| {
            let name = a.key.as_ref();
            name.contains(&b':') && local_name(name) == key
        })
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

/// Numeric attribute value, parsed as EMU.
pub(crate) fn number_attr(e: &BytesStart, key: &[u8]) -> Option<f64> {
    attr(e, key).and_then(|v| v.trim().parse::<i64>().ok()).map(|v| v as f64)
}
