//! Scripts evaluated inside UI surfaces.
//!
//! The client script gives the page its half of the protocol:
//!
//! 1. `JWB.send(type, payload)` builds a Request with a fresh id
//! 2. The pending promise is stored under that id
//! 3. The Request text goes to `__JWB_BRIDGE__.postMessage`
//! 4. `__JWB_HANDLE_RESPONSE` resolves or rejects the matching promise
//!
//! Evaluating the client script twice leaves the first installation and
//! its pending map untouched.

// ============================================================================
// Imports
// ============================================================================

use crate::bridge::{BRIDGE_OBJECT, RESPONSE_CALLBACK};
use crate::protocol::PROTOCOL_VERSION;

// ============================================================================
// Public Functions
// ============================================================================

/// Builds the client protocol script.
#[must_use]
pub fn client_script() -> String {
    CLIENT_SCRIPT_TEMPLATE
        .replace("$PROTOCOL_VERSION", PROTOCOL_VERSION)
        .replace("$BRIDGE_OBJECT", BRIDGE_OBJECT)
        .replace("$RESPONSE_CALLBACK", RESPONSE_CALLBACK)
}

/// Builds a script calling `window[name](argument)` if it is a function.
///
/// `argument` must be JSON text. It is embedded as a literal, so the page
/// receives the parsed value rather than a string.
#[must_use]
pub fn function_call_script(name: &str, argument: Option<&str>) -> String {
    let name = js_string(name);
    let argument = argument.map(js_literal).unwrap_or_default();

    format!(
        "(function () {{ var f = window[{name}]; if (typeof f === 'function') {{ f({argument}); }} }})();"
    )
}

// ============================================================================
// Internal Functions
// ============================================================================

/// Quotes `value` as a script string literal.
fn js_string(value: &str) -> String {
    js_literal(&serde_json::Value::from(value).to_string())
}

/// Makes JSON text safe to embed as a script literal.
///
/// JSON allows raw U+2028 and U+2029 inside strings; older script engines
/// treat them as line terminators.
fn js_literal(json: &str) -> String {
    json.replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

// ============================================================================
// Constants
// ============================================================================

/// Client protocol script.
const CLIENT_SCRIPT_TEMPLATE: &str = r#"(function () {
  'use strict';

  if (!window.__JWB_PENDING_MESSAGES) {
    window.__JWB_PENDING_MESSAGES = {};
  }
  var pending = window.__JWB_PENDING_MESSAGES;

  if (window.JWB && window.JWB.protocol === '$PROTOCOL_VERSION') {
    return;
  }

  function nextId() {
    if (window.crypto && typeof window.crypto.randomUUID === 'function') {
      return window.crypto.randomUUID();
    }
    return 'jwb-' + Date.now().toString(36) + '-' + Math.random().toString(36).slice(2);
  }

  window.JWB = {
    protocol: '$PROTOCOL_VERSION',

    send: function (type, payload) {
      var id = nextId();
      var message = {
        protocol: '$PROTOCOL_VERSION',
        id: id,
        type: type,
        payload: payload === undefined ? {} : payload
      };

      return new Promise(function (resolve, reject) {
        var bridge = window.$BRIDGE_OBJECT;
        if (!bridge || typeof bridge.postMessage !== 'function') {
          reject(new Error('native bridge is not available'));
          return;
        }

        pending[id] = { resolve: resolve, reject: reject };

        try {
          bridge.postMessage(JSON.stringify(message));
        } catch (e) {
          delete pending[id];
          reject(new Error('failed to post message: ' + e.message));
        }
      });
    }
  };

  window.$RESPONSE_CALLBACK = function (response) {
    var data = response;
    if (typeof response === 'string') {
      try {
        data = JSON.parse(response);
      } catch (e) {
        console.error('[JWB] unparseable response', e);
        return;
      }
    }

    var request = pending[data.id];
    if (!request) {
      console.error('[JWB] response without pending request', data.id);
      return;
    }

    delete pending[data.id];
    if (data.status === 'ERROR') {
      var error = new Error((data.payload && data.payload.message) || 'unknown error');
      error.code = data.payload && data.payload.code;
      request.reject(error);
    } else {
      request.resolve(data);
    }
  };
})();"#;

// ============================================================================
// Tests
// ============================================================================
