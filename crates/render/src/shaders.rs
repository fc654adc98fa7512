/// GLSL 330 vertex shader: transforms positions by `u_mvp`, passes texcoords through.
pub const BASIC_VERTEX_SHADER: &str = include_str!("../shaders/basic.vert");

/// GLSL 330 fragment shader: procedural checkerboard multiplied by `u_tint`.
pub const BASIC_FRAGMENT_SHADER: &str = include_str!("../shaders/basic.frag");
