fn main() {
    // Host builds (unit tests) have no ESP-IDF environment to export.
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "espidf" {
        return;
    }

    embuild::espidf::sysenv::output();

    if std::env::var("CARGO_FEATURE_EDGE_IMPULSE").is_ok() {
        // Find the C++ compiler in the Embuild toolchain directory
        // Typically: .embuild/espressif/tools/xtensa-esp-elf/esp-<VER>/xtensa-esp-elf/bin/xtensa-esp32-elf-g++
        let compiler = find_compiler().unwrap_or_else(|| TOOLCHAIN_GXX.into());
        build_ei(&compiler);
    }
}

const TOOLCHAIN_DIR: &str = "xtensa-esp-elf";
const TOOLCHAIN_GXX: &str = "xtensa-esp32-elf-g++";
const MODEL_SDK_DIR: &str = "boxing-punch_inferencing";

fn find_compiler() -> Option<std::path::PathBuf> {
    use std::path::PathBuf;
    // Check local .embuild first, then global ~/.espressif
    let mut search_dirs = Vec::new();
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        search_dirs.push(PathBuf::from(manifest_dir).join(".embuild"));
    }
    if let Some(home) = dirs::home_dir() {
        search_dirs.push(home.join(".espressif"));
    }

    for root in search_dirs {
        let tools_dir = root.join("espressif/tools").join(TOOLCHAIN_DIR);
        if tools_dir.exists() {
            // Find the versioned directory (e.g., esp-13.2.0_20240530)
            if let Ok(entries) = std::fs::read_dir(&tools_dir) {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.is_dir() {
                        let candidate = path.join(TOOLCHAIN_DIR).join("bin").join(TOOLCHAIN_GXX);
                        if candidate.exists() {
                            return Some(candidate);
                        }
                    }
                }
            }
        }
    }
    None
}

fn build_ei(compiler_path: &std::path::Path) {
    use std::path::PathBuf;

    let sdk_root = PathBuf::from(MODEL_SDK_DIR);

    let mut build = cc::Build::new();

    build
        .cpp(true)
        .compiler(compiler_path) // Explicitly set the compiler path
        .flag("-std=c++14")
        .flag("-O3")
        .flag("-g3")
        .define("EI_CLASSIFIER_ENABLE_DETECTION_3D", "0")
        .define("EI_CLASSIFIER_TFLITE_ENABLE_CMSIS_NN", "0")
        .define("EI_NATIVE_ARCH", "1")
        .include(&sdk_root)
        .include(sdk_root.join("src"))
        .include(sdk_root.join("src/edge-impulse-sdk"))
        .include(sdk_root.join("src/model-parameters"))
        .include(sdk_root.join("src/tflite-model"));

    // Recursively add source files
    add_source_files(&mut build, &sdk_root.join("src"));

    build.compile("edge-impulse-sdk");

    println!("cargo:rerun-if-changed={}", MODEL_SDK_DIR);
}

fn add_source_files(build: &mut cc::Build, dir: &std::path::Path) {
    for entry in std::fs::read_dir(dir).expect("Failed to read directory") {
        let entry = entry.expect("Failed to read directory entry");
        let path = entry.path();
        
        if path.is_dir() {
            // EI_NATIVE_ARCH selects the generic kernels, so every source dir is compiled.
            add_source_files(build, &path);
        } else if let Some(ext) = path.extension() {
            if ext == "c" || ext == "cpp" || ext == "cc" {
                build.file(&path);
            }
        }
    }
}
