use std::{
    env::{self, split_paths, var_os},
    fs,
    path::{Path, PathBuf},
    process::Command,
};

pub use find_cuda_helper::{find_cuda_root, include_cuda};

const ENVS: &[&str] = &["CUTENSOR_ROOT", "CUTENSOR_PATH", "CUTENSOR_HOME"];

/// 搜索 cuTENSOR 安装位置。
///
/// 返回 `Some(None)` 表示库位于链接器默认路径上（ldconfig 可见），不需要额外的搜索路径。
pub fn find_cutensor_root() -> Option<Option<PathBuf>> {
    if let Some(root) = ENVS
        .iter()
        .filter_map(var_os)
        .map(PathBuf::from)
        .find(|path| has_header(path))
    {
        return Some(Some(root));
    }
    // HPC SDK 和 conda 环境会把 cutensor 装进 cuda 目录
    if let Some(root) = find_cuda_root().filter(|root| has_header(root)) {
        return Some(Some(root));
    }
    if !cfg!(target_os = "linux") {
        return None;
    }
    let output = Command::new("ldconfig").arg("-p").output().ok()?;
    if String::from_utf8_lossy(&output.stdout).contains("libcutensor.so") {
        return Some(None);
    }
    ["LIBRARY_PATH", "LD_LIBRARY_PATH"]
        .into_iter()
        .filter_map(var_os)
        .flat_map(|paths| split_paths(&paths).collect::<Vec<_>>())
        .filter_map(|path| fs::read_dir(path).ok())
        .flatten()
        .filter_map(|result| result.ok())
        .find(|entry| entry.file_name() == "libcutensor.so")?
        .path()
        .ancestors()
        .skip(1)
        .find(|root| has_header(root))
        .map(|root| Some(root.into()))
}

/// Emits link directives for cuTENSOR found by [`find_cutensor_root`].
pub fn include_cutensor(root: Option<&Path>) {
    if env::var_os("DOCS_RS").is_some() || cfg!(doc) {
        return;
    }
    for env in ENVS {
        println!("cargo:rerun-if-env-changed={env}")
    }
    if let Some(lib) = root.and_then(cutensor_lib_dir) {
        println!("cargo:rustc-link-search=native={}", lib.display());
    }
    println!("cargo:rustc-link-lib=dylib=cutensor")
}

/// Header directory of a cuTENSOR root.
#[inline]
pub fn cutensor_include(root: &Path) -> PathBuf {
    root.join("include")
}

fn cutensor_lib_dir(root: &Path) -> Option<PathBuf> {
    // 发行包按 cuda 大版本分目录
    ["lib/12", "lib/11", "lib64", "lib"]
        .into_iter()
        .map(|dir| root.join(dir))
        .find(|dir| dir.join("libcutensor.so").is_file())
}

#[inline]
fn has_header(root: &Path) -> bool {
    cutensor_include(root).join("cutensor.h").is_file()
}

#[test]
fn test_find() {
    let Some(root) = find_cuda_root() else {
        println!("cuda not exist");
        return;
    };
    println!("cuda root = {}", root.display());
    let Some(cutensor) = find_cutensor_root() else {
        println!("cutensor not exist");
        return;
    };
    let Some(cutensor) = cutensor else {
        println!("find cutensor in ldconfig path");
        return;
    };
    assert!(has_header(&cutensor));
    println!("cutensor root = {}", cutensor.display())
}

#[test]
fn test_lib_dir_missing() {
    let root = env::temp_dir().join("search-cuda-tools-no-cutensor");
    assert_eq!(cutensor_lib_dir(&root), None);
    assert!(!has_header(&root));
}
