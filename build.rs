// SpecHack
// copyright zipxing@hotmail.com 2022～2025

// cfg aliases shared by the library, the cli and the tests

fn main() {
    use cfg_aliases::cfg_aliases;

    cfg_aliases! {
        // Platform aliases
        wasm: { target_arch = "wasm32" },

        // gpu probe is only compiled on native targets with the wgpu feature
        wgpu_backend: { all(feature = "wgpu", not(wasm)) },

        // file logging through log4rs
        file_log: { all(feature = "log4rs", not(wasm)) },
    }
}
