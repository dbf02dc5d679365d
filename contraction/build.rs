fn main() {
    use build_script_cfg::Cfg;
    use search_cuda_tools::{find_cuda_root, find_cutensor_root};

    let cutensor = Cfg::new("cutensor");
    if find_cuda_root().is_some() && find_cutensor_root().is_some() {
        cutensor.define();
    }
}
