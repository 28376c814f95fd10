//! `Dataspace`: shape of a dataset.

use h5wrap_sys::{hsize_t, HandleKind, SpaceClass, H5S_UNLIMITED};

use crate::error::Result;
use crate::handle::Handle;
use crate::library::Library;

#[derive(Debug, Clone)]
pub struct Dataspace {
    handle: Handle,
}

impl Dataspace {
    /// Maximum extent marking a dimension as growable without bound.
    pub const UNLIMITED: hsize_t = H5S_UNLIMITED;

    pub fn scalar(lib: &Library) -> Result<Self> {
        let id = lib.api().create_scalar_space();
        if id < 0 {
            return lib.errors().fail("failed to create scalar dataspace");
        }
        Ok(Self { handle: Handle::new(lib.clone(), id) })
    }

    /// Simple dataspace. Without `maximum` the extent is fixed.
    pub fn simple(lib: &Library, current: &[hsize_t], maximum: Option<&[hsize_t]>) -> Result<Self> {
        if let Some(max) = maximum {
            crate::ensure_local!(
                max.len() == current.len(),
                "maximum dimensions {:?} do not match the rank of {:?}",
                max,
                current
            );
        }
        let id = lib.api().create_simple_space(current, maximum);
        if id < 0 {
            return lib.errors().fail(format!("failed to create dataspace {:?}", current));
        }
        Ok(Self { handle: Handle::new(lib.clone(), id) })
    }

    pub fn from_handle(handle: Handle) -> Result<Self> {
        crate::ensure_local!(
            handle.kind()? == HandleKind::Dataspace,
            "handle {} is not a dataspace",
            handle.id()
        );
        Ok(Self { handle })
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    fn library(&self) -> Result<&Library> {
        self.handle
            .library()
            .ok_or_else(|| crate::local_err!("dataspace handle is closed"))
    }

    pub fn space_type(&self) -> Result<SpaceClass> {
        let lib = self.library()?;
        match lib.api().space_class(self.handle.id()) {
            SpaceClass::NoClass => lib.errors().fail("failed to retrieve dataspace type"),
            class => Ok(class),
        }
    }

    pub fn rank(&self) -> Result<usize> {
        let lib = self.library()?;
        let rank = lib.api().space_rank(self.handle.id());
        if rank < 0 {
            return lib.errors().fail("failed to retrieve dataspace rank");
        }
        Ok(rank as usize)
    }

    fn dimensions(&self) -> Result<(Vec<hsize_t>, Vec<hsize_t>)> {
        let rank = self.rank()?;
        let lib = self.library()?;
        let mut current = vec![0; rank];
        let mut maximum = vec![0; rank];
        if lib.api().space_dims(self.handle.id(), &mut current, &mut maximum) < 0 {
            return lib.errors().fail("failed to retrieve dataspace dimensions");
        }
        Ok((current, maximum))
    }

    pub fn current_dimensions(&self) -> Result<Vec<hsize_t>> {
        Ok(self.dimensions()?.0)
    }

    pub fn maximum_dimensions(&self) -> Result<Vec<hsize_t>> {
        Ok(self.dimensions()?.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar() {
        let lib = Library::memory();
        let s = Dataspace::scalar(&lib).unwrap();
        assert_eq!(s.space_type().unwrap(), SpaceClass::Scalar);
        assert_eq!(s.rank().unwrap(), 0);
        assert!(s.current_dimensions().unwrap().is_empty());
    }

    #[test]
    fn test_simple_fixed_and_unlimited() {
        let lib = Library::memory();
        let fixed = Dataspace::simple(&lib, &[3, 4], None).unwrap();
        assert_eq!(fixed.space_type().unwrap(), SpaceClass::Simple);
        assert_eq!(fixed.current_dimensions().unwrap(), vec![3, 4]);
        assert_eq!(fixed.maximum_dimensions().unwrap(), vec![3, 4]);

        let grow = Dataspace::simple(&lib, &[10], Some(&[Dataspace::UNLIMITED])).unwrap();
        assert_eq!(grow.maximum_dimensions().unwrap(), vec![Dataspace::UNLIMITED]);
    }

    #[test]
    fn test_rank_mismatch_is_local() {
        let lib = Library::memory();
        let e = Dataspace::simple(&lib, &[3, 4], Some(&[5])).unwrap_err();
        assert!(e.is_local());
    }

    #[test]
    fn test_native_rejection() {
        let lib = Library::memory();
        lib.errors().set_auto_print(false).unwrap();
        let e = Dataspace::simple(&lib, &[], None).unwrap_err();
        assert!(e.is_native());
        assert!(e.stack().is_some());
    }
}
