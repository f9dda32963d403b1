//! Depth scanning: cast a grid of pinhole-camera rays at an octree.
//!
//! Each pixel gets the distance to the closest hit (or `f64::INFINITY`)
//! and the face it landed on. Hit points are also gathered into a point
//! cloud in row-major order.

use octomesh_geom::{FaceIndex, Ray};
use octomesh_math::{Point3, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{OctreeError, Result};
use crate::octree::Octree;

/// Largest pixel count a scan may have; pixel indices travel as `Ray::index`.
pub const MAX_SCAN_PIXELS: usize = i32::MAX as usize;

/// Resolution and field of view of a depth scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            fov_y_degrees: 60.0,
        }
    }
}

impl ScanConfig {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(OctreeError::InvalidScan(format!(
                "resolution must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        match self.width.checked_mul(self.height) {
            Some(pixels) if pixels <= MAX_SCAN_PIXELS => {}
            _ => {
                return Err(OctreeError::InvalidScan(format!(
                    "{}x{} exceeds {MAX_SCAN_PIXELS} pixels",
                    self.width, self.height
                )))
            }
        }
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(OctreeError::InvalidScan(format!(
                "fov_y_degrees must be in (0, 180), got {}",
                self.fov_y_degrees
            )));
        }
        Ok(())
    }

    fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Pinhole camera placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanCamera {
    /// Camera position.
    pub eye: Point3,
    /// Point the camera looks at.
    pub target: Point3,
    /// Approximate up direction.
    pub up: Vec3,
}

impl ScanCamera {
    /// Camera at `eye` looking at `target`.
    pub fn look_at(eye: Point3, target: Point3, up: Vec3) -> Self {
        Self { eye, target, up }
    }
}

/// Orthonormal camera frame: `w` points backward, `u` right, `v` up.
#[derive(Debug, Clone, Copy)]
struct Basis {
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl Basis {
    fn new(camera: &ScanCamera) -> Result<Self> {
        let w = (camera.eye - camera.target)
            .try_normalize(0.0)
            .ok_or_else(|| OctreeError::InvalidScan("eye and target coincide".into()))?;
        let u = camera
            .up
            .cross(&w)
            .try_normalize(0.0)
            .ok_or_else(|| OctreeError::InvalidScan("up is parallel to the view direction".into()))?;
        let v = w.cross(&u);
        Ok(Self { u, v, w })
    }
}

/// Per-pixel scan output, row-major with row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthImage {
    width: usize,
    height: usize,
    depths: Vec<f64>,
    faces: Vec<Option<FaceIndex>>,
    points: Vec<Point3>,
}

impl DepthImage {
    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// All distances, row-major. Misses are `f64::INFINITY`.
    pub fn depths(&self) -> &[f64] {
        &self.depths
    }

    /// Distance at a pixel, `None` outside the image.
    pub fn depth_at(&self, x: usize, y: usize) -> Option<f64> {
        self.pixel(x, y).map(|i| self.depths[i])
    }

    /// Face hit at a pixel, `None` on a miss or outside the image.
    pub fn face_at(&self, x: usize, y: usize) -> Option<FaceIndex> {
        self.pixel(x, y).and_then(|i| self.faces[i])
    }

    /// Number of pixels that hit something.
    pub fn hit_count(&self) -> usize {
        self.points.len()
    }

    /// Hit points in pixel order.
    pub fn point_cloud(&self) -> &[Point3] {
        &self.points
    }

    fn pixel(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }
}

/// Casts a grid of camera rays at an octree.
#[derive(Debug)]
pub struct DepthScanner<'a> {
    octree: &'a Octree,
    camera: ScanCamera,
    config: ScanConfig,
    basis: Basis,
}

impl<'a> DepthScanner<'a> {
    /// Set up a scanner; fails on invalid settings or a degenerate camera.
    pub fn new(octree: &'a Octree, camera: ScanCamera, config: ScanConfig) -> Result<Self> {
        config.validate()?;
        let basis = Basis::new(&camera)?;
        Ok(Self {
            octree,
            camera,
            config,
            basis,
        })
    }

    /// Ray through the center of pixel `(x, y)`, tagged with its row-major index.
    ///
    /// Pixels outside the image get index `-1`.
    pub fn ray(&self, x: usize, y: usize) -> Ray {
        let half_h = (self.config.fov_y_degrees.to_radians() * 0.5).tan();
        let half_w = half_h * self.config.aspect_ratio();

        let sx = (x as f64 + 0.5) / self.config.width as f64 * 2.0 - 1.0;
        let sy = 1.0 - (y as f64 + 0.5) / self.config.height as f64 * 2.0;

        let Basis { u, v, w } = self.basis;
        let direction = u * (sx * half_w) + v * (sy * half_h) - w;
        let index = if x < self.config.width && y < self.config.height {
            // In range: validate caps the pixel count at i32::MAX
            i32::try_from(y * self.config.width + x).unwrap_or(-1)
        } else {
            -1
        };
        Ray::new(self.camera.eye, direction).with_index(index)
    }

    /// Scan every pixel.
    pub fn scan(&self) -> DepthImage {
        let ScanConfig { width, height, .. } = self.config;
        let mut depths = Vec::with_capacity(width * height);
        let mut faces = Vec::with_capacity(width * height);
        let mut points = Vec::new();

        for y in 0..height {
            for x in 0..width {
                let ray = self.ray(x, y);
                match self.octree.closest_intersection(&ray) {
                    Some((point, face)) => {
                        depths.push((point - ray.origin).norm());
                        faces.push(Some(face));
                        points.push(point);
                    }
                    None => {
                        depths.push(f64::INFINITY);
                        faces.push(None);
                    }
                }
            }
        }

        tracing::debug!(width, height, hits = points.len(), "depth scan finished");

        DepthImage {
            width,
            height,
            depths,
            faces,
            points,
        }
    }
}
