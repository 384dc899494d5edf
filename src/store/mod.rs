pub(crate) mod indexed;
