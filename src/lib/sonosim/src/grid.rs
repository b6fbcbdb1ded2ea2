use crate::vec3::Vec3;
use bytemuck::Pod;

/// Identifier of one cell inside a [`CellBlock`]. Bijective with the integer
/// triple `(i, j, k)` through z-fastest linearization:
/// `id = i·ny·nz + j·nz + k`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellId(pub usize);

/// Dense 3-D storage of one scalar field in contiguous memory.
///
/// The block knows nothing about units or coordinate ranges; it is plain
/// storage plus index arithmetic. Mapping cells to real-space positions is
/// the job of [`Interpolation`].
pub struct CellBlock<T> {
    dimension_size: Vec3<usize>,
    data: Vec<T>,
}

impl<T: Copy + Default> CellBlock<T> {
    /// Allocate a block of `dimension_size.product()` default-initialized
    /// cells.
    pub fn new(dimension_size: Vec3<usize>) -> Self {
        Self {
            dimension_size,
            data: vec![T::default(); dimension_size.product()],
        }
    }

    pub fn get_cell(&self, id: CellId) -> T {
        self.data[id.0]
    }

    pub fn set_cell(&mut self, id: CellId, value: T) {
        self.data[id.0] = value;
    }

    pub fn dimension_size(&self) -> Vec3<usize> {
        self.dimension_size
    }

    /// Number of cells in the block
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Mutable view over all cells in linear id order. Stages partition this
    /// slice across workers; each cell is written by at most one worker.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Pod> CellBlock<T> {
    /// Contiguous byte view of the cell data in native host byte order, for
    /// binary export. The slice length is `len() * size_of::<T>()`.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

/// Maps cell ids of a block onto a lattice in real space.
///
/// For `id` with integer triple `(i, j, k)` the real-space position is
/// `lerp(begin, end, (i/nx, j/ny, k/nz))` componentwise, so consecutive
/// lattice points along an axis are `(end - begin) / n` apart. Pure
/// coordinate transform; owns no data.
#[derive(Clone, Debug)]
pub struct Interpolation {
    dimension_size: Vec3<usize>,
    begin: Vec3<f64>,
    end: Vec3<f64>,
}

impl Interpolation {
    /// No check is performed on the bounds.
    pub fn new(dimension_size: Vec3<usize>, begin: Vec3<f64>, end: Vec3<f64>) -> Self {
        Self {
            dimension_size,
            begin,
            end,
        }
    }

    /// Real-space position of a cell
    pub fn get_real_vec(&self, id: CellId) -> Vec3<f64> {
        let pos = self
            .get_int_vec(id)
            .cast_f64()
            .elem_division(self.dimension_size.cast_f64());
        self.begin.lerp(self.end, pos)
    }

    /// Integer triple `(i, j, k)` of a cell
    pub fn get_int_vec(&self, id: CellId) -> Vec3<usize> {
        let dim = self.dimension_size;
        Vec3::new(
            (id.0 / dim.z / dim.y) % dim.x,
            (id.0 / dim.z) % dim.y,
            id.0 % dim.z,
        )
    }

    /// Cell id of an integer triple; inverse of [`get_int_vec`] for in-range
    /// triples.
    ///
    /// [`get_int_vec`]: Interpolation::get_int_vec
    pub fn get_id(&self, vec: Vec3<usize>) -> CellId {
        let dim = self.dimension_size;
        CellId(vec.x * dim.z * dim.y + vec.y * dim.z + vec.z)
    }

    pub fn get_cell_count(&self) -> usize {
        self.dimension_size.product()
    }

    pub fn dimension_size(&self) -> Vec3<usize> {
        self.dimension_size
    }

    pub fn begin(&self) -> Vec3<f64> {
        self.begin
    }

    pub fn end(&self) -> Vec3<f64> {
        self.end
    }
}
