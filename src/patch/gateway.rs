//! Gateway network, auth and control-UI rules.

use serde_json::{json, Value};

use super::PatchContext;
use crate::config::{ConfigDocument, GATEWAY_MODE, GATEWAY_PORT, TRUSTED_PROXY_CIDR};
use crate::env;

/// Fixed port, mode and trusted proxy; the auth token when one is given.
/// Other gateway fields are preserved.
pub fn apply_gateway_network(mut doc: ConfigDocument, ctx: &PatchContext<'_>) -> ConfigDocument {
    let gateway = doc.object_mut(&["gateway"]);
    gateway.insert("port".into(), json!(GATEWAY_PORT));
    gateway.insert("mode".into(), json!(GATEWAY_MODE));
    gateway.insert("trustedProxies".into(), json!([TRUSTED_PROXY_CIDR]));

    if let Some(token) = ctx.env.get(env::GATEWAY_TOKEN) {
        doc.set(&["gateway", "auth", "token"], json!(token));
    }
    doc
}

/// `gateway.controlUi.allowInsecureAuth` always mirrors `DEV_MODE`.
///
/// This overwrites whatever a restored document carries; a value left over
/// from an earlier boot must not survive a change of the flag.
pub fn apply_control_ui(mut doc: ConfigDocument, ctx: &PatchContext<'_>) -> ConfigDocument {
    doc.set(
        &["gateway", "controlUi", "allowInsecureAuth"],
        Value::Bool(ctx.env.flag(env::DEV_MODE)),
    );
    doc
}
