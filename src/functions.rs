//! Install scripts for the extraction function library.
//!
//! Compiled views reference `json_*` / `jsonb_*` functions by name. Installing
//! them is the caller's job; these scripts are one way to do it.

use crate::schema::{Encoding, Kind};

const CORE_TEMPLATE: &str = include_str!("../sql/json_functions.sql");
const POSTGIS_TEMPLATE: &str = include_str!("../sql/json_functions_postgis.sql");

fn render(template: &str, encoding: Encoding) -> String {
    template.replace("{enc}", encoding.prefix())
}

/// Core functions for `encoding` (every kind but geopoint, plus elements).
pub fn install_sql(encoding: Encoding) -> String {
    render(CORE_TEMPLATE, encoding)
}

/// Geopoint functions for `encoding`. Requires PostGIS.
pub fn install_postgis_sql(encoding: Encoding) -> String {
    render(POSTGIS_TEMPLATE, encoding)
}

/// Install script for several encodings, optionally with PostGIS support.
pub fn install_script(encodings: &[Encoding], postgis: bool) -> String {
    let mut parts = Vec::new();
    for encoding in encodings {
        parts.push(install_sql(*encoding));
        if postgis {
            parts.push(install_postgis_sql(*encoding));
        }
    }
    parts.join("\n")
}

/// Every function name the compiler may reference for `encoding`.
pub fn function_names(encoding: Encoding) -> Vec<String> {
    Kind::ALL
        .iter()
        .map(|kind| kind.function_name(encoding))
        .chain(std::iter::once(encoding.elements_function().to_string()))
        .collect()
}
