/// Example: Parse an OBJ file and print what the viewer would upload
///
/// Usage: cargo run --example inspect_obj -- path/to/mesh.obj

use skyview_core::{load_mesh, FsSource};
use std::env;
use std::process;

fn main() {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "assets/torus.obj".to_string());

    let mesh = match load_mesh(&FsSource::new(""), &path) {
        Ok(mesh) => mesh,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let buffers = mesh.buffers();
    println!("{}", path);
    println!("  vertices:   {} (item size {})", buffers.positions.count, buffers.positions.item_size);
    println!("  triangles:  {}", mesh.triangle_count());
    println!("  normals:    {} (item size {})", buffers.normals.count, buffers.normals.item_size);
    match &buffers.tex_coords {
        Some(tc) => println!("  tex coords: {}", tc.count),
        None => println!("  tex coords: none"),
    }

    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for p in mesh.positions().chunks_exact(4) {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    println!("  bounds:     {:?} .. {:?}", min, max);

    let zero_normals = mesh
        .normals()
        .chunks_exact(3)
        .filter(|n| n.iter().all(|&c| c == 0.0))
        .count();
    if zero_normals > 0 {
        println!("  {} vertices have no usable normal", zero_normals);
    }
}
