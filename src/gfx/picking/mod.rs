//! # Pointer Ray-Casting
//!
//! Converts a pointer position in normalized device coordinates into a world
//! space ray and intersects it with scene objects.
//!
//! ## How it works
//!
//! 1. **Pointer to Ray**: unproject the NDC point through the camera
//! 2. **Broad phase**: test the ray against each mesh's world-space AABB
//! 3. **Narrow phase**: test the ray against every triangle of surviving meshes
//!
//! Unlike a single-pick selector, [`Raycaster::intersect_objects`] reports
//! every object the ray passes through, sorted nearest first.
//!
//! ## Usage
//!
//! ```no_run
//! use cgmath::Vector2;
//! use galaxy_scene::gfx::picking::Raycaster;
//! # fn demo(scene: &galaxy_scene::gfx::scene::SceneContext) {
//! let raycaster = Raycaster::from_camera(Vector2::new(0.0, 0.0), &scene.camera);
//! if let Some(duck) = scene.duck.as_ref() {
//!     let hovered = !raycaster.intersect_object(duck).is_empty();
//! }
//! # }
//! ```

use cgmath::{
    ElementWise, InnerSpace, Matrix4, SquareMatrix, Vector2, Vector3, Vector4, Zero,
};

use crate::gfx::{camera::CameraRig, scene::object::Object};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl AABB {
    /// Create a new AABB
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Create AABB from a set of vertices
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        if vertices.is_empty() {
            return Self::new(Vector3::zero(), Vector3::zero());
        }

        let mut min = Vector3::new(vertices[0][0], vertices[0][1], vertices[0][2]);
        let mut max = min;

        for vertex in vertices.iter().skip(1) {
            let v = Vector3::new(vertex[0], vertex[1], vertex[2]);
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }

        Self::new(min, max)
    }

    /// Test ray-AABB intersection
    /// Returns the distance to intersection point, or None if no intersection
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Apply a transformation matrix to the AABB
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        // Transform all 8 corners of the AABB and compute new bounds
        let corners = [
            Vector3::new(self.min.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.min.z),
            Vector3::new(self.min.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.max.z),
            Vector3::new(self.min.x, self.max.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.max.z),
        ];

        let transformed_corners: Vec<[f32; 3]> = corners
            .iter()
            .map(|corner| {
                let transformed = matrix * corner.extend(1.0);
                [
                    transformed.x / transformed.w,
                    transformed.y / transformed.w,
                    transformed.z / transformed.w,
                ]
            })
            .collect();

        Self::from_vertices(&transformed_corners)
    }
}

/// A single ray hit
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    /// Position of the hit object in the slice passed to the query
    pub object_index: usize,
    /// Distance from the ray origin to the hit
    pub distance: f32,
    /// World space intersection point
    pub point: Vector3<f32>,
}

/// Ray caster built from the pointer and the camera each frame
#[derive(Debug, Clone, Copy)]
pub struct Raycaster {
    pub ray: Ray,
}

impl Raycaster {
    pub fn new(ray: Ray) -> Self {
        Self { ray }
    }

    /// Ray from the camera's world position through the pointer
    ///
    /// `ndc` is the pointer in normalized device coordinates, both axes in
    /// `[-1, 1]` with +Y up.
    pub fn from_camera(ndc: Vector2<f32>, camera: &CameraRig) -> Self {
        let origin = camera.world_position();
        let inv_view_proj = camera
            .view_projection_gl()
            .invert()
            .unwrap_or(Matrix4::from_scale(1.0));

        let target = inv_view_proj * Vector4::new(ndc.x, ndc.y, 0.5, 1.0);
        let target = target.truncate() / target.w;

        Self::new(Ray::new(origin, target - origin))
    }

    /// Every triangle hit on `object`, nearest first
    pub fn intersect_object(&self, object: &Object) -> Vec<Intersection> {
        let mut hits = self.hits_for(object, 0);
        sort_by_distance(&mut hits);
        hits
    }

    /// Hits across all `objects`, nearest first
    ///
    /// `object_index` in each hit is the object's position in the iterator.
    /// An object can appear more than once if the ray crosses it repeatedly.
    pub fn intersect_objects<'a, I>(&self, objects: I) -> Vec<Intersection>
    where
        I: IntoIterator<Item = &'a Object>,
    {
        let mut hits: Vec<Intersection> = objects
            .into_iter()
            .enumerate()
            .flat_map(|(index, object)| self.hits_for(object, index))
            .collect();
        sort_by_distance(&mut hits);
        hits
    }

    fn hits_for(&self, object: &Object, object_index: usize) -> Vec<Intersection> {
        let world = object.world_matrix();
        let Some(inverse) = world.invert() else {
            return Vec::new();
        };

        // Narrow phase runs in the object's local space
        let local_origin = (inverse * self.ray.origin.extend(1.0)).truncate();
        let local_direction = (inverse * self.ray.direction.extend(0.0)).truncate();

        let mut hits = Vec::new();
        for mesh in &object.meshes {
            if mesh.bounds().transform(&world).intersect_ray(&self.ray).is_none() {
                continue;
            }

            for triangle in mesh.triangles() {
                let Some(t) = intersect_triangle(local_origin, local_direction, triangle) else {
                    continue;
                };
                let local_point = local_origin + local_direction * t;
                let point = (world * local_point.extend(1.0)).truncate();
                hits.push(Intersection {
                    object_index,
                    distance: (point - self.ray.origin).magnitude(),
                    point,
                });
            }
        }
        hits
    }
}

fn sort_by_distance(hits: &mut [Intersection]) {
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}

/// Möller–Trumbore ray/triangle test, double-sided
///
/// Returns the ray parameter `t >= 0` of the hit in units of `direction`.
pub fn intersect_triangle(
    origin: Vector3<f32>,
    direction: Vector3<f32>,
    triangle: [[f32; 3]; 3],
) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let v0 = Vector3::from(triangle[0]);
    let v1 = Vector3::from(triangle[1]);
    let v2 = Vector3::from(triangle[2]);

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let p = direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < EPSILON {
        return None; // Parallel to the triangle plane
    }

    let inv_det = 1.0 / det;
    let s = origin - v0;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::Rgb;
    use crate::gfx::camera::PerspectiveCamera;
    use crate::gfx::geometry::generate_sphere;
    use crate::gfx::scene::object::{Material, Mesh};
    use approx::assert_relative_eq;
    use cgmath::Deg;

    fn camera_at(z: f32) -> CameraRig {
        let mut camera = PerspectiveCamera::new(Deg(35.0), 1.0, 0.1, 1000.0);
        camera.position = Vector3::new(0.0, 0.0, z);
        CameraRig::new(camera)
    }

    fn sphere_at(position: Vector3<f32>) -> Object {
        let geometry = generate_sphere(0.3, 16, 16);
        let mut object = Object::new(
            "sphere",
            vec![Mesh::from_geometry(&geometry)],
            Material::basic(Rgb::WHITE),
        );
        object.transform.position = position;
        object
    }

    #[test]
    fn test_aabb_creation() {
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]];
        let aabb = AABB::from_vertices(&vertices);

        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = AABB::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        // Ray hitting the box
        let ray = Ray::new(Vector3::new(0.1, 0.1, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray).is_some());

        // Ray missing the box
        let ray_miss = Ray::new(Vector3::new(5.0, 0.1, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray_miss).is_none());
    }

    #[test]
    fn test_triangle_hit_and_miss() {
        let triangle = [[-1.0, -1.0, 0.0], [1.0, -1.0, 0.0], [0.0, 1.0, 0.0]];
        let down = Vector3::new(0.0, 0.0, -1.0);

        let t = intersect_triangle(Vector3::new(0.0, 0.0, 2.0), down, triangle);
        assert_relative_eq!(t.unwrap(), 2.0);

        assert!(intersect_triangle(Vector3::new(3.0, 0.0, 2.0), down, triangle).is_none());
        // Behind the origin
        assert!(intersect_triangle(Vector3::new(0.0, 0.0, -2.0), down, triangle).is_none());
    }

    #[test]
    fn test_centre_ray_points_down_negative_z() {
        let raycaster = Raycaster::from_camera(Vector2::new(0.0, 0.0), &camera_at(6.0));

        assert_relative_eq!(raycaster.ray.origin.z, 6.0);
        assert_relative_eq!(raycaster.ray.direction.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(raycaster.ray.direction.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(raycaster.ray.direction.z, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_intersect_objects_reports_every_hit() {
        let front = sphere_at(Vector3::new(0.0, 0.0, 0.0));
        let back = sphere_at(Vector3::new(0.0, 0.0, -3.0));
        let aside = sphere_at(Vector3::new(2.0, 0.0, 0.0));
        let objects = [front, back, aside];

        let raycaster = Raycaster::from_camera(Vector2::new(0.0, 0.0), &camera_at(6.0));
        let hits = raycaster.intersect_objects(objects.iter());

        assert!(hits.iter().any(|h| h.object_index == 0));
        assert!(hits.iter().any(|h| h.object_index == 1));
        assert!(hits.iter().all(|h| h.object_index != 2));
        assert_eq!(hits[0].object_index, 0);
        assert_relative_eq!(hits[0].distance, 5.7, epsilon = 0.05);
    }

    #[test]
    fn test_scaled_object_is_hit_in_world_space() {
        let mut object = sphere_at(Vector3::new(0.0, 0.0, 0.0));
        object.transform.set_uniform_scale(3.0);

        // Ray passes 0.6 off-centre: outside the unit sphere scaled by 0.3, inside when scaled by 3
        let raycaster = Raycaster::new(Ray::new(
            Vector3::new(0.6, 0.0, 6.0),
            Vector3::new(0.0, 0.0, -1.0),
        ));
        assert!(!raycaster.intersect_object(&object).is_empty());

        object.transform.set_uniform_scale(1.0);
        assert!(raycaster.intersect_object(&object).is_empty());
    }
}
