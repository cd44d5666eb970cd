//! Disk-backed [`ImageStore`] that writes each committed upload to its own file.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// crates.io
use uuid::Uuid;
// self
use crate::{
	_prelude::*,
	store::{StoreError, StoreFuture},
};

const MAX_IMAGE_TYPE_LEN: usize = 16;

/// Metadata describing one committed image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
	/// Image identifier.
	pub id: String,
	/// Laptop the image belongs to.
	pub laptop_id: String,
	/// File extension including the leading dot, e.g. `.jpg`.
	pub image_type: String,
	/// Location of the image bytes.
	pub path: PathBuf,
	/// Image size in bytes.
	pub size: u64,
}

/// Storage contract for uploaded laptop images.
pub trait ImageStore
where
	Self: Send + Sync,
{
	/// Commits a fully received image as one record.
	fn save<'a>(
		&'a self,
		laptop_id: &'a str,
		image_type: &'a str,
		data: Vec<u8>,
	) -> StoreFuture<'a, ImageRecord>;

	/// Fetches the record for `id`, if present.
	fn find<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<ImageRecord>>;
}

/// Returns `true` when `image_type` is a bare file extension such as `.png`.
pub fn is_valid_image_type(image_type: &str) -> bool {
	match image_type.strip_prefix('.') {
		Some(ext) =>
			!ext.is_empty()
				&& image_type.len() <= MAX_IMAGE_TYPE_LEN
				&& ext.chars().all(|c| c.is_ascii_alphanumeric()),
		None => false,
	}
}

/// Writes images under a folder and indexes their metadata in memory.
#[derive(Clone, Debug)]
pub struct DiskImageStore {
	folder: PathBuf,
	images: Arc<RwLock<HashMap<String, ImageRecord>>>,
}
impl DiskImageStore {
	/// Opens (or creates) the image folder.
	pub fn open(folder: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let folder = folder.into();

		fs::create_dir_all(&folder).map_err(|e| StoreError::Backend {
			message: format!("Failed to create image folder {}: {e}", folder.display()),
		})?;

		Ok(Self { folder, images: Default::default() })
	}

	/// Folder holding the image files.
	pub fn folder(&self) -> &Path {
		&self.folder
	}

	/// Number of committed images.
	pub fn len(&self) -> usize {
		self.images.read().len()
	}

	/// Returns `true` when no image was committed.
	pub fn is_empty(&self) -> bool {
		self.images.read().is_empty()
	}

	fn write_now(&self, id: &str, image_type: &str, data: &[u8]) -> Result<PathBuf, StoreError> {
		let path = self.folder.join(format!("{id}{image_type}"));
		let tmp_path = self.folder.join(format!("{id}.tmp"));

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(data).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &path).map_err(|e| {
			let _ = fs::remove_file(&tmp_path);

			StoreError::Backend { message: format!("Failed to replace {}: {e}", path.display()) }
		})?;

		Ok(path)
	}
}
impl ImageStore for DiskImageStore {
	fn save<'a>(
		&'a self,
		laptop_id: &'a str,
		image_type: &'a str,
		data: Vec<u8>,
	) -> StoreFuture<'a, ImageRecord> {
		Box::pin(async move {
			if !is_valid_image_type(image_type) {
				return Err(StoreError::Backend {
					message: format!("Image type `{image_type}` is not a file extension"),
				});
			}

			let id = Uuid::new_v4().to_string();
			let path = self.write_now(&id, image_type, &data)?;
			let record = ImageRecord {
				id: id.clone(),
				laptop_id: laptop_id.to_owned(),
				image_type: image_type.to_owned(),
				path,
				size: data.len() as u64,
			};

			self.images.write().insert(id, record.clone());

			Ok(record)
		})
	}

	fn find<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<ImageRecord>> {
		Box::pin(async move { Ok(self.images.read().get(id).cloned()) })
	}
}
