use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use scalespace_image::Image;
use scalespace_imgproc::filter::{convolve, gaussian_blur, kernels};

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("Gaussian Blur");

    for (width, height) in [(256, 224), (512, 448)].iter() {
        for sigma in [0.5f32, 1.0, 2.0, 4.0].iter() {
            let radius = kernels::gaussian_radius(*sigma);
            let kernel_size = 2 * radius + 1;
            group.throughput(criterion::Throughput::Elements(
                (*width * *height * kernel_size * kernel_size) as u64,
            ));

            let parameter_string = format!("{}x{}x{}", width, height, sigma);

            let image_size = [*width, *height].into();
            let image_data = (0..(width * height)).map(|x| (x % 255) as f32).collect();
            let image = Image::<f32, 1>::new(image_size, image_data).unwrap();
            let output = Image::<f32, 1>::from_size_val(image_size, 0.0).unwrap();

            group.bench_with_input(
                BenchmarkId::new("gaussian_blur", &parameter_string),
                &(&image, &output),
                |b, i| {
                    let (src, mut dst) = (i.0, i.1.clone());
                    b.iter(|| black_box(gaussian_blur(src, &mut dst, *sigma)).unwrap())
                },
            );
        }
    }
    group.finish();

    let mut group = c.benchmark_group("Laplacian");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        let image_size = [*width, *height].into();
        let image = Image::<f32, 3>::from_size_val(image_size, 1.0).unwrap();
        let output = Image::<f32, 3>::from_size_val(image_size, 0.0).unwrap();
        let kernel = kernels::laplacian_kernel();

        group.bench_with_input(
            BenchmarkId::new("convolve_laplacian_3c", &parameter_string),
            &(&image, &output),
            |b, i| {
                let (src, mut dst) = (i.0, i.1.clone());
                b.iter(|| black_box(convolve(src, &mut dst, &kernel)).unwrap())
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_filters);
criterion_main!(benches);
