use crate::database::models::RoomTypeImage;

/// Leave exactly one cover image: the single marked one, otherwise the first.
pub fn normalize_cover(images: &mut [RoomTypeImage]) {
    let covers = images.iter().filter(|image| image.is_cover).count();
    if covers == 1 || images.is_empty() {
        return;
    }
    for image in images.iter_mut() {
        image.is_cover = false;
    }
    images[0].is_cover = true;
}
