//! Bootstrap script generation.
//!
//! The bootstrap is the only script the host itself evaluates.  It runs in
//! the sandbox's global scope before any other code and installs:
//!
//! * `console`, with exactly `log` and `error`, both routed through
//!   `core.print(text, isError)`;
//! * the capability namespace, one wrapper per registered operation, each
//!   forwarding its arguments unchanged to `core.ops.<op_id>`.
//!
//! Asynchronous wrappers are `async` functions, so a failing host call
//! always surfaces as a rejected promise rather than a synchronous throw.
//! Both objects are frozen and installed as non-writable globals.  A global
//! marker makes a second evaluation in the same realm a no-op.

use std::fmt::Write;

use crate::config::BridgeConfig;
use crate::namespace::{CapabilityNamespace, NamespaceEntry};

/// Registry key of the symbol that marks a realm as bootstrapped.
pub const BOOTSTRAP_MARKER: &str = "opbridge.bootstrap";

/// Generate the bootstrap script for `namespace`.
///
/// `config` must already be validated: its names are spliced into the
/// script verbatim.
pub fn bootstrap_script(namespace: &CapabilityNamespace, config: &BridgeConfig) -> String {
    let mut out = String::with_capacity(2048);

    out.push_str("((globalThis) => {\n");
    let _ = writeln!(out, "    const marker = Symbol.for(\"{BOOTSTRAP_MARKER}\");");
    out.push_str("    if (globalThis[marker]) {\n        return;\n    }\n\n");
    let _ = writeln!(out, "    const core = {};\n", config.core_binding);

    out.push_str(
        "    function argsToMessage(...args) {\n        \
         return args.map((arg) => JSON.stringify(arg)).join(\" \");\n    \
         }\n\n",
    );

    out.push_str("    const console = Object.freeze({\n");
    out.push_str(
        "        log: (...args) => {\n            \
         core.print(`[out]: ${argsToMessage(...args)}\\n`, false);\n        },\n",
    );
    out.push_str(
        "        error: (...args) => {\n            \
         core.print(`[err]: ${argsToMessage(...args)}\\n`, true);\n        },\n",
    );
    out.push_str("    });\n\n");

    out.push_str("    const namespace = Object.freeze({\n");
    for entry in namespace.entries() {
        push_wrapper(&mut out, entry);
    }
    out.push_str("    });\n\n");

    push_global(&mut out, "console", "console");
    push_global(&mut out, namespace.name(), "namespace");
    out.push_str(
        "    Object.defineProperty(globalThis, marker, { value: true });\n",
    );
    out.push_str("})(globalThis);\n");
    out
}

fn push_wrapper(out: &mut String, entry: &NamespaceEntry) {
    let params: Vec<&str> = entry.descriptor.params().iter().map(|p| p.name).collect();
    let params = params.join(", ");
    let prefix = if entry.is_async() { "async " } else { "" };
    let _ = writeln!(
        out,
        "        {member}: {prefix}({params}) => core.ops.{op_id}({params}),",
        member = entry.member,
        op_id = entry.op().op_id(),
    );
}

fn push_global(out: &mut String, global: &str, value: &str) {
    let _ = writeln!(
        out,
        "    Object.defineProperty(globalThis, \"{global}\", {{ value: {value}, writable: false, enumerable: false, configurable: false }});"
    );
}

#[cfg(test)]
mod tests {
    use opbridge_registry::{HostConfig, OpRegistry};

    use super::*;

    fn script(config: &BridgeConfig) -> String {
        let registry = OpRegistry::standard(&HostConfig::default()).unwrap();
        let ns = CapabilityNamespace::from_registry(config.namespace.clone(), &registry);
        bootstrap_script(&ns, config)
    }

    #[test]
    fn one_wrapper_per_descriptor() {
        let src = script(&BridgeConfig::default());
        let registry = OpRegistry::standard(&HostConfig::default()).unwrap();
        for descriptor in registry.descriptors() {
            let call = format!("core.ops.{}(", descriptor.name.op_id());
            assert_eq!(src.matches(&call).count(), 1, "{call}");
            let member = format!("        {}: ", descriptor.name.script_name());
            assert_eq!(src.matches(&member).count(), 1, "{member}");
        }
    }

    #[test]
    fn async_ops_get_async_wrappers() {
        let src = script(&BridgeConfig::default());
        assert!(src.contains("readFile: async (path) => core.ops.op_read_file(path),"));
        assert!(src.contains(
            "writeFile: async (path, contents) => core.ops.op_write_file(path, contents),"
        ));
        assert!(src.contains("removeFile: (path) => core.ops.op_remove_file(path),"));
        assert!(src.contains("integer_x_3: (input) => core.ops.integer_x_3(input),"));
    }

    #[test]
    fn console_routes_through_core_print() {
        let src = script(&BridgeConfig::default());
        assert!(src.contains("const core = Deno.core;"));
        assert!(src.contains("core.print(`[out]: ${argsToMessage(...args)}\\n`, false);"));
        assert!(src.contains("core.print(`[err]: ${argsToMessage(...args)}\\n`, true);"));
        assert!(src.contains("JSON.stringify(arg)"));
    }

    #[test]
    fn installs_under_configured_names() {
        let cfg = BridgeConfig::new()
            .with_namespace("host")
            .with_core_binding("bridge.core");
        let src = script(&cfg);
        assert!(src.contains("const core = bridge.core;"));
        assert!(src.contains("Object.defineProperty(globalThis, \"host\", { value: namespace"));
        assert!(!src.contains("\"runjs\""));
    }

    #[test]
    fn guarded_by_marker() {
        let src = script(&BridgeConfig::default());
        let guard = src.find("if (globalThis[marker])").unwrap();
        let install = src.find("Object.defineProperty").unwrap();
        assert!(guard < install);
        assert!(src.contains("Symbol.for(\"opbridge.bootstrap\")"));
        assert!(src.trim_end().ends_with("})(globalThis);"));
    }

    #[test]
    fn empty_registry_still_installs_console() {
        let ns = CapabilityNamespace::from_registry("runjs", &OpRegistry::default());
        let src = bootstrap_script(&ns, &BridgeConfig::default());
        assert!(src.contains("const namespace = Object.freeze({\n    });"));
        assert!(src.contains("log: (...args)"));
    }
}
