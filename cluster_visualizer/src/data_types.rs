pub(crate) mod dof_value;
