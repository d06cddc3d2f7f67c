//! Trainable parameter tensor
//!
//! A flat `f32` buffer with a logical shape and a gradient slot. Layers read
//! their weights as matrix views and accumulate gradients during their own
//! backward pass; optimizers and clipping walk `&mut [&mut Tensor]`.

use ndarray::{Array1, ArrayView1, ArrayView2, ArrayViewMut2};
use std::cell::{Ref, RefCell};

/// Parameter tensor with an optional accumulated gradient
#[derive(Debug, Clone)]
pub struct Tensor {
    data: Array1<f32>,
    shape: Vec<usize>,
    grad: RefCell<Option<Array1<f32>>>,
    requires_grad: bool,
}

impl Tensor {
    /// Create a tensor from flat row-major data and a shape
    ///
    /// # Panics
    /// Panics if `shape` does not describe `data.len()` elements.
    pub fn new(data: Array1<f32>, shape: Vec<usize>, requires_grad: bool) -> Self {
        assert_eq!(
            shape.iter().product::<usize>(),
            data.len(),
            "tensor shape {shape:?} does not match {} elements",
            data.len()
        );
        Self { data, shape, grad: RefCell::new(None), requires_grad }
    }

    /// Create a 1-D tensor from a vector
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        let len = data.len();
        Self::new(Array1::from(data), vec![len], requires_grad)
    }

    /// Create a tensor with the given shape from a vector
    pub fn from_shape_vec(shape: Vec<usize>, data: Vec<f32>, requires_grad: bool) -> Self {
        Self::new(Array1::from(data), shape, requires_grad)
    }

    /// Create a zero-filled tensor
    pub fn zeros(shape: Vec<usize>, requires_grad: bool) -> Self {
        let len: usize = shape.iter().product();
        Self::new(Array1::zeros(len), shape, requires_grad)
    }

    /// Create a tensor filled with a constant
    pub fn full(shape: Vec<usize>, value: f32, requires_grad: bool) -> Self {
        let len: usize = shape.iter().product();
        Self::new(Array1::from_elem(len, value), shape, requires_grad)
    }

    /// Flat data
    pub fn data(&self) -> &Array1<f32> {
        &self.data
    }

    /// Mutable flat data
    pub fn data_mut(&mut self) -> &mut Array1<f32> {
        &mut self.data
    }

    /// Logical shape
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor has no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// View a 2-D tensor as a `[rows, cols]` matrix
    ///
    /// # Panics
    /// Panics if the tensor is not 2-D.
    pub fn matrix(&self) -> ArrayView2<'_, f32> {
        assert_eq!(self.shape.len(), 2, "matrix view requires a 2-D tensor, got {:?}", self.shape);
        ArrayView2::from_shape(
            (self.shape[0], self.shape[1]),
            self.data.as_slice().expect("tensor data is contiguous"),
        )
        .expect("shape checked at construction")
    }

    /// View as a vector
    pub fn vector(&self) -> ArrayView1<'_, f32> {
        self.data.view()
    }

    /// Row `i` of a 2-D tensor
    pub fn row(&self, i: usize) -> ArrayView1<'_, f32> {
        let cols = self.shape[self.shape.len() - 1];
        self.data.slice(ndarray::s![i * cols..(i + 1) * cols])
    }

    /// Whether gradients are tracked for this tensor
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Enable or disable gradient tracking
    pub fn set_requires_grad(&mut self, requires_grad: bool) {
        self.requires_grad = requires_grad;
    }

    /// Current gradient (copied)
    pub fn grad(&self) -> Option<Array1<f32>> {
        self.grad.borrow().clone()
    }

    /// Borrow the gradient as a flat slice
    pub fn grad_slice(&self) -> Option<Ref<'_, [f32]>> {
        Ref::filter_map(self.grad.borrow(), |grad| grad.as_ref().and_then(|g| g.as_slice())).ok()
    }

    /// Mutable gradient, borrowed through `&mut self` without a runtime check
    pub fn grad_mut(&mut self) -> Option<&mut Array1<f32>> {
        self.grad.get_mut().as_mut()
    }

    /// Data for an in-place update alongside the gradient driving it
    pub fn data_and_grad_mut(&mut self) -> (&mut Array1<f32>, Option<&Array1<f32>>) {
        (&mut self.data, self.grad.get_mut().as_ref())
    }

    /// Replace the gradient
    pub fn set_grad(&self, grad: Array1<f32>) {
        *self.grad.borrow_mut() = Some(grad);
    }

    /// Add into the gradient, initializing it on first use
    pub fn accumulate_grad(&self, grad: Array1<f32>) {
        if !self.requires_grad {
            return;
        }
        let mut slot = self.grad.borrow_mut();
        match slot.as_mut() {
            Some(existing) => *existing += &grad,
            None => *slot = Some(grad),
        }
    }

    /// Add into the gradient of a single row of a 2-D tensor
    pub fn accumulate_row_grad(&self, row: usize, grad: ArrayView1<'_, f32>) {
        if !self.requires_grad {
            return;
        }
        let cols = self.shape[self.shape.len() - 1];
        let mut slot = self.grad.borrow_mut();
        let full = slot.get_or_insert_with(|| Array1::zeros(self.data.len()));
        let mut target = full.slice_mut(ndarray::s![row * cols..(row + 1) * cols]);
        target += &grad;
    }

    /// Add a `[rows, cols]` gradient into a 2-D tensor's gradient
    pub fn accumulate_matrix_grad(&self, grad: ArrayView2<'_, f32>) {
        if !self.requires_grad {
            return;
        }
        assert_eq!(grad.len(), self.data.len(), "gradient shape {:?} does not match {:?}", grad.shape(), self.shape);
        let mut slot = self.grad.borrow_mut();
        let full = slot.get_or_insert_with(|| Array1::zeros(self.data.len()));
        let mut target = ArrayViewMut2::from_shape(
            grad.raw_dim(),
            full.as_slice_mut().expect("gradient buffer is contiguous"),
        )
        .expect("element count checked above");
        target += &grad;
    }

    /// Clear the gradient
    pub fn zero_grad(&self) {
        *self.grad.borrow_mut() = None;
    }
}
