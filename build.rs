
// without a static backend feature, ndarray-linalg and annembed resolve lapack through the system lapacke
#[cfg(not(any(feature="intel-mkl-static", feature="openblas-static")))]
fn main() {
    println!("cargo:rustc-link-lib=lapacke");
}

#[cfg(any(feature="intel-mkl-static", feature="openblas-static"))]
fn main() {
}
