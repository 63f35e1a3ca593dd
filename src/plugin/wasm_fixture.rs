//! Minimal WASM modules for tests. Also compiled into `tests/` by path, so it
//! must not reference the crate.

/// A module exporting each name as `() -> i32` returning 0.
pub fn wasm_exporting(names: &[&str]) -> Vec<u8> {
    let mut module = vec![0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];
    module.extend([0x01, 0x05, 0x01, 0x60, 0x00, 0x01, 0x7f]);

    let mut functions = vec![names.len() as u8];
    functions.extend(std::iter::repeat_n(0x00, names.len()));
    section(&mut module, 0x03, functions);

    let mut exports = vec![names.len() as u8];
    for (index, name) in names.iter().enumerate() {
        exports.push(name.len() as u8);
        exports.extend(name.as_bytes());
        exports.extend([0x00, index as u8]);
    }
    section(&mut module, 0x07, exports);

    let mut code = vec![names.len() as u8];
    for _ in names {
        code.extend([0x04, 0x00, 0x41, 0x00, 0x0b]);
    }
    section(&mut module, 0x0a, code);

    module
}

fn section(module: &mut Vec<u8>, id: u8, body: Vec<u8>) {
    module.push(id);
    module.push(body.len() as u8);
    module.extend(body);
}
