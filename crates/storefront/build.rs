//! Compiles the Protocol Buffer definitions for the gRPC transport.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::configure()
        .build_server(true)
        // Client code is handy for integration testing against a running server.
        .build_client(true)
        .compile_protos(&["proto/storefront.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/storefront.proto");

    Ok(())
}
