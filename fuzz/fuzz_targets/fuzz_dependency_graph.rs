#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_vulntree::analyze;
use serde_json::json;

const MAX_COMPONENTS: usize = 24;
// Tree views enumerate simple paths, which grow exponentially with edge density
const MAX_EDGES: usize = 16;

/// Fuzz propagation and materialization on arbitrary dependency topologies.
///
/// Each byte pair is one edge; the low bit of the first byte marks the target
/// as vulnerable.
fuzz_target!(|data: &[u8]| {
    let Some((&count, edges)) = data.split_first() else {
        return;
    };
    let count = usize::from(count) % MAX_COMPONENTS + 1;
    let edges = &edges[..edges.len().min(MAX_EDGES * 2)];
    let name = |b: u8| format!("c{}", usize::from(b) % count);

    let components: Vec<_> = (0..count).map(|i| json!({"bom-ref": format!("c{i}")})).collect();
    let dependencies: Vec<_> = edges
        .chunks_exact(2)
        .map(|pair| json!({"ref": name(pair[0]), "dependsOn": [name(pair[1])]}))
        .collect();
    let vulnerabilities: Vec<_> = edges
        .chunks_exact(2)
        .filter(|pair| pair[0] & 1 == 1)
        .map(|pair| json!({"id": format!("V{}", pair[0]), "affects": [{"ref": name(pair[1])}]}))
        .collect();

    let _ = analyze(&json!({
        "components": components,
        "dependencies": dependencies,
        "vulnerabilities": vulnerabilities
    }));
});
