use chrono::Utc;

fn main() {
    // Build time shown in the startup log / 构建时间
    let build_time = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    println!("cargo:rustc-env=BUILD_TIME={}", build_time);

    // Embedded UI changes must trigger a rebuild / 前端文件变化时重新构建
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=frontend");
}
