use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared-ownership handle to an externally owned object.
///
/// Every `ObjectRef` is one strong reference. Cloning takes a new strong
/// reference and dropping releases it, so a store that holds an `ObjectRef`
/// keeps the object alive for exactly as long as the attribute exists.
///
/// Equality between handles is identity: two handles are equal only when
/// they point at the same allocation.
#[derive(Clone)]
pub struct ObjectRef(Arc<dyn Any + Send + Sync>);

impl ObjectRef {
    /// Wrap `value` in a new shared allocation.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Take a new strong reference to an existing allocation.
    pub fn from_arc<T: Any + Send + Sync>(arc: Arc<T>) -> Self {
        Self(arc)
    }

    /// Returns a new strong reference to the object if it is a `T`.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.0).downcast::<T>().ok()
    }

    /// Returns `true` if the object is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Returns `true` if both handles refer to the same object.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }

    /// Number of strong references currently held on the object.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({:p})", Arc::as_ptr(&self.0).cast::<()>())
    }
}
