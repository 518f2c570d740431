use crate::common::validation::Issue;

/// Types that are authored in one form and executed in another, such as a
/// list of phrases and the single matcher built from them.
pub trait CompilableTo<T> {
    fn compile(&self) -> Result<T, Issue>;
}
