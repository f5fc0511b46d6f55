/// One-time load phase: fetch mesh sources by name and build render-ready geometry
use std::io;
use std::path::PathBuf;

use log::info;

use crate::error::LoadError;
use crate::geometry::{Mesh, SkyboxGeometry};
use crate::obj::{parse_obj, ObjData};

/// Resolves a resource name to its text
pub trait SourceFetch {
    fn fetch(&self, name: &str) -> io::Result<String>;
}

/// Reads resources from files below a root directory
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SourceFetch for FsSource {
    fn fetch(&self, name: &str) -> io::Result<String> {
        std::fs::read_to_string(self.root.join(name))
    }
}

fn fetch_and_parse<S>(source: &S, name: &str) -> Result<ObjData, LoadError>
where
    S: SourceFetch + ?Sized,
{
    let text = source.fetch(name).map_err(|source| LoadError::Fetch {
        name: name.to_string(),
        source,
    })?;
    Ok(parse_obj(name, &text)?)
}

/// Load a mesh and derive its vertex normals.
pub fn load_mesh<S>(source: &S, name: &str) -> Result<Mesh, LoadError>
where
    S: SourceFetch + ?Sized,
{
    let mesh = Mesh::from_obj(fetch_and_parse(source, name)?);
    info!(
        "Loaded mesh `{}`: {} vertices, {} triangles",
        name,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Load the skybox cube and split it into its six faces.
pub fn load_skybox<S>(source: &S, name: &str) -> Result<SkyboxGeometry, LoadError>
where
    S: SourceFetch + ?Sized,
{
    let data = fetch_and_parse(source, name)?;
    let skybox = SkyboxGeometry::partition(&data).map_err(|reason| LoadError::SkyboxShape {
        name: name.to_string(),
        reason,
    })?;
    info!("Loaded skybox `{}`", name);
    Ok(skybox)
}
