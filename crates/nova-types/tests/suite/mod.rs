mod minimal_jdk_subtyping;
mod capture;
