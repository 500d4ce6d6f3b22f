use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use sandbug_compile::{CompileError, CompilerRegistry, Mode, PanelKind};

#[test]
fn unregistered_modes_are_identity() {
    let registry = CompilerRegistry::with_builtins();
    let source = "body\n  color: red\n";
    for mode in Mode::ALL {
        if registry.is_registered(mode) {
            continue;
        }
        assert_eq!(registry.compile(mode, source), source, "{mode}");
    }
}

#[test]
fn builtins_cover_every_panel_default() {
    let registry = CompilerRegistry::with_builtins();
    for panel in PanelKind::ALL {
        assert!(registry.is_registered(panel.default_mode()));
    }
    let mut modes: Vec<_> = registry.modes().collect();
    modes.sort();
    assert_eq!(
        modes,
        vec![Mode::Html, Mode::Gfm, Mode::Markdown, Mode::Css, Mode::JavaScript]
    );
}

#[test]
fn closures_capture_host_state() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut registry = CompilerRegistry::with_builtins();
    registry.register(Mode::TypeScript, move |source: &str| {
        counter.fetch_add(1, Ordering::Relaxed);
        if source.contains(": number") {
            Ok(source.replace(": number", ""))
        } else {
            Err(CompileError::failed("no annotations"))
        }
    });

    assert_eq!(
        registry.compile(Mode::TypeScript, "let x: number = 1;"),
        "let x = 1;"
    );
    assert_eq!(registry.compile(Mode::TypeScript, "let y = 2;"), "let y = 2;");
    assert_eq!(calls.load(Ordering::Relaxed), 2);
}

#[test]
fn compiled_inputs_serialize_with_wire_names() {
    let registry = CompilerRegistry::with_builtins();
    let compiled = registry.compile_input(PanelKind::Style, "css", "p{}");
    let json = serde_json::to_value(&compiled).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "panel": "style",
            "mode": "css",
            "content": "p{}",
            "output": "p{}",
        })
    );
}
