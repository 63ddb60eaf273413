// ABOUTME: Classifies images, volumes and networks as used or orphaned.
// ABOUTME: Pure functions over one container snapshot.

use crate::model::{Classified, Container, ContainerRef, Image, Network, Volume};

fn referencing<'a, F>(containers: &'a [Container], uses: F) -> Vec<ContainerRef>
where
    F: Fn(&'a Container) -> bool,
{
    containers
        .iter()
        .filter(|c| uses(c))
        .map(ContainerRef::from)
        .collect()
}

pub fn classify_images(images: Vec<Image>, containers: &[Container]) -> Vec<Classified<Image>> {
    images
        .into_iter()
        .map(|image| {
            let used_by = referencing(containers, |c| image.is_used_by(&c.image_id, &c.image));
            Classified::new(image, used_by)
        })
        .collect()
}

pub fn classify_volumes(volumes: Vec<Volume>, containers: &[Container]) -> Vec<Classified<Volume>> {
    volumes
        .into_iter()
        .map(|volume| {
            let used_by = referencing(containers, |c| {
                c.mounts.iter().any(|m| m.volume_name() == Some(volume.name.as_str()))
            });
            Classified::new(volume, used_by)
        })
        .collect()
}

pub fn classify_networks(networks: Vec<Network>, containers: &[Container]) -> Vec<Classified<Network>> {
    networks
        .into_iter()
        .map(|network| {
            let used_by = referencing(containers, |c| network_used_by(&network, c));
            let classified = Classified::new(network, used_by);
            if classified.resource.is_system() {
                classified.system()
            } else {
                classified
            }
        })
        .collect()
}

/// Attached by name, by network id prefix, or named as the network mode.
pub fn network_used_by(network: &Network, container: &Container) -> bool {
    if container.attached_networks().any(|name| name == network.name) {
        return true;
    }

    let id = network.id.as_str();
    !id.is_empty()
        && container.network_settings.networks.values().any(|endpoint| {
            let theirs = endpoint.network_id.as_str();
            !theirs.is_empty() && (id.starts_with(theirs) || theirs.starts_with(id))
        })
}
